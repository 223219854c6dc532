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

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::OnceLock,
};

use super::SourceView;

/// Structural counts reported alongside a classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMetrics {
    /// Loop headers
    pub loops: usize,
    /// Loop headers inside another loop
    pub nested_loops: usize,
    /// `if`, `else if`, `elif` and `switch` lines
    pub conditionals: usize,
    /// Function or method definitions
    pub function_defs: usize,
    /// Calls to a function defined in the same source, outside definition lines
    pub recursive_calls: usize,
}

struct MetricPatterns {
    conditional: Regex,
    script_fn: Regex,
    typed_fn: Regex,
    call: Regex,
}

fn metric_patterns() -> &'static MetricPatterns {
    static PATTERNS: OnceLock<MetricPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MetricPatterns {
        conditional: Regex::new(r"^(?:\}\s*)?(?:if|elif|else\s+if|switch)\b").unwrap(),
        script_fn: Regex::new(r"^(?:async\s+)?(?:def|function)\s+([A-Za-z_]\w*)\s*\(").unwrap(),
        typed_fn: Regex::new(
            r"^(?:(?:public|private|protected|internal|static|final|virtual|override|inline|async)\s+)*([A-Za-z_][\w<>\[\],:]*)\s+([A-Za-z_]\w*)\s*\([^;]*\)\s*(?:\{|$)",
        )
        .unwrap(),
        call: Regex::new(r"\b([A-Za-z_]\w*)\s*\(").unwrap(),
    })
}

/// Keywords that look like a return type or name in statement lines
const NOT_A_SIGNATURE: &[&str] =
    &["if", "for", "foreach", "while", "switch", "catch", "using", "lock", "return", "new", "else"];

impl CodeMetrics {
    /// Count structural elements of preprocessed source
    pub fn from_view(view: &SourceView<'_>) -> Self {
        let patterns = metric_patterns();
        let mut metrics = Self {
            loops: view.loops().len(),
            nested_loops: view.loops().iter().filter(|l| l.depth > 0).count(),
            ..Self::default()
        };

        let mut defined = BTreeSet::new();
        let mut definition_lines = BTreeSet::new();
        for line in view.code_lines() {
            if patterns.conditional.is_match(line.text) {
                metrics.conditionals += 1;
            } else if let Some(name) = function_name(patterns, line.text) {
                metrics.function_defs += 1;
                defined.insert(name);
                definition_lines.insert(line.number);
            }
        }

        metrics.recursive_calls = view
            .code_lines()
            .filter(|line| !definition_lines.contains(&line.number))
            .map(|line| {
                patterns
                    .call
                    .captures_iter(line.text)
                    .filter_map(|caps| caps.get(1))
                    // method calls on other receivers are not calls of local functions
                    .filter(|name| !line.text[..name.start()].ends_with('.'))
                    .filter(|name| defined.contains(name.as_str()))
                    .count()
            })
            .sum();

        metrics
    }

    /// Metrics keyed by name, in the shape reported by analysis responses
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("loops".to_string(), self.loops as f64),
            ("nested_loops".to_string(), self.nested_loops as f64),
            ("conditionals".to_string(), self.conditionals as f64),
            ("function_defs".to_string(), self.function_defs as f64),
            ("recursive_calls".to_string(), self.recursive_calls as f64),
        ])
    }
}

/// Name of the function defined on `text`, if the line is a definition
fn function_name<'a>(patterns: &MetricPatterns, text: &'a str) -> Option<&'a str> {
    if let Some(caps) = patterns.script_fn.captures(text) {
        return caps.get(1).map(|name| name.as_str());
    }
    let caps = patterns.typed_fn.captures(text)?;
    let (ty, name) = (caps.get(1)?.as_str(), caps.get(2)?.as_str());
    (!NOT_A_SIGNATURE.contains(&ty) && !NOT_A_SIGNATURE.contains(&name)).then_some(name)
}
