// CodeViz - Algorithm Playground Core
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};
use thiserror::Error;

/// Display language of a program in the playground
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python
    #[default]
    #[display("python")]
    Python,
    /// Java
    #[display("java")]
    Java,
    /// C++
    #[display("cpp")]
    Cpp,
    /// C#
    #[display("csharp")]
    CSharp,
}

/// Error returned for an unsupported language name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}' (expected python, java, cpp or csharp)")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Every supported language
    pub const ALL: [Self; 4] = [Self::Python, Self::Java, Self::Cpp, Self::CSharp];

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
        }
    }

    /// Guess the language from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "py" => Some(Self::Python),
            "java" => Some(Self::Java),
            "cpp" | "cc" | "cxx" | "hpp" | "h" => Some(Self::Cpp),
            "cs" => Some(Self::CSharp),
            _ => None,
        }
    }

    /// Bundled example program: a multiplication table of size `n` read from input
    pub fn example_program(&self) -> &'static str {
        match self {
            Self::Python => PYTHON_EXAMPLE,
            Self::Java => JAVA_EXAMPLE,
            Self::Cpp => CPP_EXAMPLE,
            Self::CSharp => CSHARP_EXAMPLE,
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "cpp" | "c++" => Ok(Self::Cpp),
            "csharp" | "c#" | "cs" => Ok(Self::CSharp),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

const PYTHON_EXAMPLE: &str = r#"# Python example
n = int(input("Enter a number (n): "))

for i in range(1, n + 1):
    print(f"Table of {i}:")
    for j in range(1, 11):
        print(f"{i} x {j} = {i * j}")
    print()"#;

const JAVA_EXAMPLE: &str = r#"// Java example
import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner scanner = new Scanner(System.in);
        System.out.print("Enter a number (n): ");
        int n = scanner.nextInt();

        for (int i = 1; i <= n; i++) {
            System.out.println("Table of " + i + ":");
            for (int j = 1; j <= 10; j++) {
                System.out.println(i + " x " + j + " = " + (i * j));
            }
            System.out.println();
        }
    }
}"#;

const CPP_EXAMPLE: &str = r#"// C++ example
#include <iostream>
using namespace std;

int main() {
    int n;
    cout << "Enter a number (n): ";
    cin >> n;

    for (int i = 1; i <= n; i++) {
        cout << "Table of " << i << ":" << endl;
        for (int j = 1; j <= 10; j++) {
            cout << i << " x " << j << " = " << (i * j) << endl;
        }
        cout << endl;
    }

    return 0;
}"#;

const CSHARP_EXAMPLE: &str = r#"// C# example
using System;

class Program {
    static void Main() {
        Console.Write("Enter a number (n): ");
        int n = Convert.ToInt32(Console.ReadLine());

        for (int i = 1; i <= n; i++) {
            Console.WriteLine($"Table of {i}:");
            for (int j = 1; j <= 10; j++) {
                Console.WriteLine($"{i} x {j} = {i * j}");
            }
            Console.WriteLine();
        }
    }
}"#;
