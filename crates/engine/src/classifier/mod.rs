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

//! Heuristic complexity classification
//!
//! Source text is mapped to a time and a space class by two ordered rule
//! sets. Classification is pure and total: every input yields a class, and
//! the same input always yields the same class.
//!
//! ```text
//! time:  nested loop -> O(n²), loop -> O(n), halving loop -> O(log n), else O(1)
//! space: input-sized allocation -> O(n), else O(1)
//! ```

mod metrics;
mod rules;
mod source;

pub use metrics::*;
pub use rules::*;
pub use source::*;

use codeviz_common::{Complexity, ComplexityClass};
use std::sync::OnceLock;
use tracing::trace;

/// A classification together with the rules that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Time and space classes
    pub complexity: Complexity,
    /// Name of the time rule that matched, `None` for the fallback
    pub time_rule: Option<String>,
    /// Name of the space rule that matched, `None` for the fallback
    pub space_rule: Option<String>,
}

/// Maps source text to a [`Complexity`]
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    time_rules: RuleSet,
    space_rules: RuleSet,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(RuleSet::default_time(), RuleSet::default_space())
    }
}

impl ComplexityClassifier {
    /// Create a classifier from custom rule sets
    pub fn new(time_rules: RuleSet, space_rules: RuleSet) -> Self {
        Self { time_rules, space_rules }
    }

    /// Time rules in priority order
    pub fn time_rules(&self) -> &RuleSet {
        &self.time_rules
    }

    /// Space rules in priority order
    pub fn space_rules(&self) -> &RuleSet {
        &self.space_rules
    }

    /// Mutable access to the time rules, e.g. to insert a custom rule
    pub fn time_rules_mut(&mut self) -> &mut RuleSet {
        &mut self.time_rules
    }

    /// Mutable access to the space rules
    pub fn space_rules_mut(&mut self) -> &mut RuleSet {
        &mut self.space_rules
    }

    /// Classify source text
    pub fn classify(&self, source: &str) -> Complexity {
        self.explain(source).complexity
    }

    /// Classify source text and report which rules decided
    pub fn explain(&self, source: &str) -> Classification {
        let view = SourceView::new(source);
        let time = self.time_rules.first_match(&view);
        let space = self.space_rules.first_match(&view);

        let classification = Classification {
            complexity: Complexity::new(
                time.map_or(self.time_rules.fallback(), Rule::class),
                space.map_or(self.space_rules.fallback(), Rule::class),
            ),
            time_rule: time.map(|rule| rule.name().to_string()),
            space_rule: space.map(|rule| rule.name().to_string()),
        };
        trace!(
            time = %classification.complexity.time,
            space = %classification.complexity.space,
            time_rule = ?classification.time_rule,
            space_rule = ?classification.space_rule,
            "Classified {} significant lines",
            view.lines().len()
        );
        classification
    }

    /// Count loops, conditionals and function definitions
    pub fn metrics(&self, source: &str) -> CodeMetrics {
        CodeMetrics::from_view(&SourceView::new(source))
    }
}

/// Classify source text with the default rules
pub fn classify(source: &str) -> Complexity {
    static DEFAULT: OnceLock<ComplexityClassifier> = OnceLock::new();
    DEFAULT.get_or_init(ComplexityClassifier::default).classify(source)
}

/// Time class of source text with the default rules
pub fn time_class(source: &str) -> ComplexityClass {
    classify(source).time
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeviz_common::Language;

    #[test]
    fn test_classify_examples() {
        for language in Language::ALL {
            let complexity = classify(language.example_program());
            assert_eq!(complexity.time, ComplexityClass::Quadratic, "{language}");
            assert_eq!(complexity.space, ComplexityClass::Constant, "{language}");
        }
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(classify(""), Complexity::default());
    }

    #[test]
    fn test_explain_reports_rules() {
        let classifier = ComplexityClassifier::default();
        let explained = classifier.explain("xs = []\nfor x in data:\n    xs.append(x)");
        assert_eq!(explained.complexity.time, ComplexityClass::Linear);
        assert_eq!(explained.complexity.space, ComplexityClass::Linear);
        assert_eq!(explained.time_rule.as_deref(), Some("loop"));
        assert_eq!(explained.space_rule.as_deref(), Some("dynamic append"));

        let constant = classifier.explain("print(1)");
        assert_eq!(constant.time_rule, None);
        assert_eq!(constant.space_rule, None);
    }

    #[test]
    fn test_custom_rule_takes_priority() {
        let mut classifier = ComplexityClassifier::default();
        classifier.time_rules_mut().insert(
            0,
            Rule::line("binary search", r"\bmid\s*=", ComplexityClass::Logarithmic).unwrap(),
        );
        let src = "while lo < hi:\n    mid = (lo + hi) // 2\n    lo = mid + 1";
        assert_eq!(classifier.classify(src).time, ComplexityClass::Logarithmic);
        assert_eq!(classify(src).time, ComplexityClass::Linear);
    }
}
