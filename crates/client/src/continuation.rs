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

//! Interactive input continuation
//!
//! Programs that read a count from input are finished locally once the
//! user answers: the remaining output is synthesized from the shape of the
//! program (a Fibonacci sequence or a multiplication table).

use itertools::Itertools;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::terminal::DEFAULT_PROMPT;

/// Largest Fibonacci term count whose terms all fit in a `u128`
pub const MAX_FIBONACCI_TERMS: u64 = 187;

/// Largest multiplication table size
pub const MAX_TABLE_ROWS: u64 = 100;

/// Columns of each multiplication table
const TABLE_COLUMNS: u64 = 10;

/// Lines lookbehind when searching for a prompt before the read
const PROMPT_LOOKBEHIND: usize = 3;

/// Output shape of a program waiting for a count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramShape {
    /// Prints the first `n` Fibonacci numbers on one line
    Fibonacci,
    /// Prints the tables of `1..=n`, ten rows each
    MultiplicationTable,
}

impl ProgramShape {
    /// Guess the shape from the source text
    pub fn detect(source: &str) -> Self {
        if source.contains("Fibonacci") {
            Self::Fibonacci
        } else {
            Self::MultiplicationTable
        }
    }

    fn limit(&self) -> (u64, &'static str) {
        match self {
            Self::Fibonacci => (MAX_FIBONACCI_TERMS, "terms"),
            Self::MultiplicationTable => (MAX_TABLE_ROWS, "tables"),
        }
    }
}

/// User input that cannot drive the program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Not an integer
    #[error("Invalid input '{input}': please enter a whole number")]
    NotAnInteger {
        /// Raw input
        input: String,
    },
    /// Below zero
    #[error("Invalid input {value}: the number must not be negative")]
    Negative {
        /// Parsed value
        value: i128,
    },
    /// More output than can be produced
    #[error("Input {value} is too large: at most {max} {unit} can be generated")]
    TooLarge {
        /// Requested count
        value: String,
        /// Largest accepted count
        max: u64,
        /// What is being counted
        unit: &'static str,
    },
}

/// Parse a non-negative count
pub fn parse_count(input: &str) -> Result<u64, InputError> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotAnInteger { input: trimmed.to_string() });
    }

    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(InputError::Negative { value: trimmed.parse().unwrap_or(i128::MIN) });
    }
    digits.parse().map_err(|_| InputError::TooLarge {
        value: trimmed.to_string(),
        max: u64::MAX,
        unit: "items",
    })
}

/// First `n` Fibonacci numbers, starting at 0
pub fn fibonacci_terms(n: u64) -> Result<Vec<u128>, InputError> {
    let too_large =
        || InputError::TooLarge { value: n.to_string(), max: MAX_FIBONACCI_TERMS, unit: "terms" };
    if n > MAX_FIBONACCI_TERMS {
        return Err(too_large());
    }

    let mut pair = (Some(0u128), Some(1u128));
    (0..n)
        .map(|_| {
            let term = pair.0;
            pair = (pair.1, pair.0.zip(pair.1).and_then(|(a, b)| a.checked_add(b)));
            term
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(too_large)
}

/// Output lines of `shape` for count `n`
pub fn synthesize(shape: ProgramShape, n: u64) -> Result<Vec<String>, InputError> {
    let (max, unit) = shape.limit();
    if n > max {
        return Err(InputError::TooLarge { value: n.to_string(), max, unit });
    }

    Ok(match shape {
        ProgramShape::Fibonacci => vec![fibonacci_terms(n)?.iter().join(" ")],
        ProgramShape::MultiplicationTable => (1..=n)
            .flat_map(|i| {
                std::iter::once(format!("Table of {i}:"))
                    .chain((1..=TABLE_COLUMNS).map(move |j| format!("{i} x {j} = {}", i * j)))
                    .chain(std::iter::once(String::new()))
            })
            .collect(),
    })
}

/// Finish `source` with the user's answer
pub fn continue_program(source: &str, input: &str) -> Result<Vec<String>, InputError> {
    let n = parse_count(input)?;
    synthesize(ProgramShape::detect(source), n)
}

struct InputPatterns {
    reads_input: Regex,
    read_call: Regex,
    string_literal: Regex,
}

fn input_patterns() -> &'static InputPatterns {
    static PATTERNS: OnceLock<InputPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| InputPatterns {
        reads_input: Regex::new(r"\binput\s*\(|\bScanner\b|\bcin\s*>>|Console\.ReadLine\s*\(")
            .unwrap(),
        read_call: Regex::new(
            r"\binput\s*\(|\.next(?:Int|Line|Long|Double)?\s*\(|\bcin\s*>>|Console\.ReadLine\s*\(",
        )
        .unwrap(),
        string_literal: Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap(),
    })
}

/// Whether the program reads interactive input
pub fn reads_input(source: &str) -> bool {
    input_patterns().reads_input.is_match(source)
}

/// Prompt shown while the program waits for input, `None` if it never reads
///
/// The prompt is the string literal on the reading line, or the nearest one
/// printed just before it; `>>>` otherwise.
pub fn input_prompt(source: &str) -> Option<String> {
    if !reads_input(source) {
        return None;
    }

    let patterns = input_patterns();
    let lines: Vec<_> = source.lines().collect();
    let read_at = lines
        .iter()
        .position(|line| patterns.read_call.is_match(line))
        .or_else(|| lines.iter().position(|line| patterns.reads_input.is_match(line)));

    let literal = read_at.and_then(|idx| {
        let same_line = patterns.string_literal.captures_iter(lines[idx]).next();
        same_line
            .or_else(|| {
                lines[idx.saturating_sub(PROMPT_LOOKBEHIND)..idx]
                    .iter()
                    .rev()
                    .find_map(|line| patterns.string_literal.captures_iter(line).last())
            })
            .map(|caps| caps[1].to_string())
    });

    Some(literal.filter(|p| !p.trim().is_empty()).unwrap_or_else(|| DEFAULT_PROMPT.to_string()))
}
