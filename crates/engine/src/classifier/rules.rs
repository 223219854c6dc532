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

//! Ordered classification rules
//!
//! A [`RuleSet`] is evaluated top to bottom and the first matching rule
//! decides the class. When nothing matches, the fallback class applies.

use codeviz_common::ComplexityClass;
use regex::Regex;

use super::SourceView;

/// What a rule looks for in the source
#[derive(Debug, Clone)]
pub enum Pattern {
    /// A loop whose header sits inside another loop's body
    NestedLoop,
    /// Any loop that is not a halving loop
    Loop,
    /// `while v > 0` loop whose body halves `v`
    HalvingLoop,
    /// A regular expression matched against each code line
    Line(Regex),
}

impl Pattern {
    /// Check the pattern against preprocessed source
    pub fn matches(&self, view: &SourceView<'_>) -> bool {
        match self {
            Self::NestedLoop => view.has_nested_loop(),
            Self::Loop => view.has_plain_loop(),
            Self::HalvingLoop => view.has_halving_loop(),
            Self::Line(re) => view.code_lines().any(|line| re.is_match(line.text)),
        }
    }
}

/// A named pattern mapped to the class it implies
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Pattern,
    class: ComplexityClass,
}

impl Rule {
    /// Create a new rule
    pub fn new(name: impl Into<String>, pattern: Pattern, class: ComplexityClass) -> Self {
        Self { name: name.into(), pattern, class }
    }

    /// Create a line rule from a regular expression
    pub fn line(
        name: impl Into<String>,
        pattern: &str,
        class: ComplexityClass,
    ) -> Result<Self, regex::Error> {
        Ok(Self::new(name, Pattern::Line(Regex::new(pattern)?), class))
    }

    /// Rule name, used when explaining a classification
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class implied by a match
    pub fn class(&self) -> ComplexityClass {
        self.class
    }

    /// Pattern of the rule
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Check whether the rule matches
    pub fn matches(&self, view: &SourceView<'_>) -> bool {
        self.pattern.matches(view)
    }
}

/// Ordered rules with a fallback class
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: ComplexityClass,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new(fallback: ComplexityClass) -> Self {
        Self { rules: Vec::new(), fallback }
    }

    /// Builder form of [`RuleSet::push`]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.push(rule);
        self
    }

    /// Append a rule with the lowest priority so far
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Insert a rule at `index`, shifting lower priority rules down
    ///
    /// Indices past the end append.
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Class used when no rule matches
    pub fn fallback(&self) -> ComplexityClass {
        self.fallback
    }

    /// First rule matching the source, if any
    pub fn first_match(&self, view: &SourceView<'_>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(view))
    }

    /// Class of the first matching rule, or the fallback
    pub fn evaluate(&self, view: &SourceView<'_>) -> ComplexityClass {
        self.first_match(view).map_or(self.fallback, Rule::class)
    }

    /// Time rules: nested loop, loop, halving loop, then constant
    pub fn default_time() -> Self {
        Self::new(ComplexityClass::Constant)
            .with_rule(Rule::new("nested loop", Pattern::NestedLoop, ComplexityClass::Quadratic))
            .with_rule(Rule::new("loop", Pattern::Loop, ComplexityClass::Linear))
            .with_rule(Rule::new(
                "halving loop",
                Pattern::HalvingLoop,
                ComplexityClass::Logarithmic,
            ))
    }

    /// Space rules: any allocation sized by the input, then constant
    pub fn default_space() -> Self {
        SPACE_PATTERNS.iter().fold(Self::new(ComplexityClass::Constant), |rules, (name, re)| {
            rules.with_rule(builtin(name, re, ComplexityClass::Linear))
        })
    }
}

const SPACE_PATTERNS: &[(&str, &str)] = &[
    ("array allocation", r"\bnew\s+[A-Za-z_][\w:<>]*\s*\["),
    (
        "collection allocation",
        r"\bnew\s+(?:List|ArrayList|LinkedList|HashMap|HashSet|Dictionary|Stack|Queue)\b|\b(?:vector|deque|unordered_map|unordered_set)\s*<",
    ),
    ("list repetition", r"=\s*\[[^\]]*\]\s*\*"),
    ("list comprehension", r"=\s*\[[^\]]*\bfor\b"),
    ("collection constructor", r"\b(?:list|dict|set)\s*\("),
    ("dynamic append", r"\.(?:append|push_back|push|Add|add)\s*\("),
    ("heap allocation", r"\b(?:malloc|calloc|realloc)\s*\("),
    ("empty collection literal", r"=\s*(?:\[\s*\]|\{\s*\})\s*;?$"),
];

fn builtin(name: &str, pattern: &str, class: ComplexityClass) -> Rule {
    // Built-in patterns are constants covered by tests
    Rule::line(name, pattern, class).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(src: &str) -> ComplexityClass {
        RuleSet::default_time().evaluate(&SourceView::new(src))
    }

    fn space_rule(src: &str) -> Option<String> {
        let rules = RuleSet::default_space();
        rules.first_match(&SourceView::new(src)).map(|rule| rule.name().to_string())
    }

    #[test]
    fn test_default_time_order() {
        let rules = RuleSet::default_time();
        let names: Vec<_> = rules.rules().iter().map(Rule::name).collect();
        assert_eq!(names, ["nested loop", "loop", "halving loop"]);
    }

    #[test]
    fn test_time_classes() {
        assert_eq!(time("x = 1\nprint(x)"), ComplexityClass::Constant);
        assert_eq!(time("for i in range(n):\n    print(i)"), ComplexityClass::Linear);
        assert_eq!(time("while n > 0:\n    n = n / 2"), ComplexityClass::Logarithmic);
        assert_eq!(
            time("for i in range(n):\n    for j in range(n):\n        print(i, j)"),
            ComplexityClass::Quadratic
        );
    }

    #[test]
    fn test_nested_wins_over_halving() {
        let src = "while n > 0:\n    n = n / 2\nfor i in range(n):\n    for j in range(n):\n        pass";
        assert_eq!(time(src), ComplexityClass::Quadratic);
    }

    #[test]
    fn test_plain_loop_wins_over_halving() {
        let src = "while n > 0:\n    n = n / 2\nfor i in range(n):\n    print(i)";
        assert_eq!(time(src), ComplexityClass::Linear);
    }

    #[test]
    fn test_space_patterns() {
        assert_eq!(space_rule("int[] a = new int[n];").as_deref(), Some("array allocation"));
        assert_eq!(
            space_rule("List<int> xs = new List<int>();").as_deref(),
            Some("collection allocation")
        );
        assert_eq!(space_rule("std::vector<int> v(n);").as_deref(), Some("collection allocation"));
        assert_eq!(space_rule("dp = [0] * (n + 1)").as_deref(), Some("list repetition"));
        assert_eq!(space_rule("sq = [i * i for i in xs]").as_deref(), Some("list comprehension"));
        assert_eq!(space_rule("xs = list(range(n))").as_deref(), Some("collection constructor"));
        assert_eq!(space_rule("out.append(i)").as_deref(), Some("dynamic append"));
        assert_eq!(
            space_rule("int *p = malloc(n * sizeof(int));").as_deref(),
            Some("heap allocation")
        );
        assert_eq!(space_rule("seen = {}").as_deref(), Some("empty collection literal"));
    }

    #[test]
    fn test_space_constant_for_scalars() {
        assert_eq!(space_rule("x = arr[i] * 2\ntotal = total + x"), None);
        assert_eq!(space_rule("reset(x)"), None);
        for language in codeviz_common::Language::ALL {
            assert_eq!(space_rule(language.example_program()), None, "{language}");
        }
    }

    #[test]
    fn test_insert_and_push() {
        let mut rules = RuleSet::default_time();
        let recursion =
            Rule::line("recursion", r"\breturn\s+fib\(", ComplexityClass::Quadratic).unwrap();
        rules.insert(0, recursion);
        rules.push(Rule::line("sort", r"\.sort\(", ComplexityClass::Linear).unwrap());
        rules.insert(99, Rule::new("tail", Pattern::Loop, ComplexityClass::Linear));

        assert_eq!(rules.rules().len(), 6);
        assert_eq!(rules.rules()[0].name(), "recursion");
        assert_eq!(rules.rules()[5].name(), "tail");
        assert_eq!(
            rules.evaluate(&SourceView::new("return fib(n-1) + fib(n-2)")),
            ComplexityClass::Quadratic
        );
        assert_eq!(rules.evaluate(&SourceView::new("xs.sort()")), ComplexityClass::Linear);
        assert_eq!(rules.evaluate(&SourceView::new("x = 1")), rules.fallback());
    }

    #[test]
    fn test_invalid_user_pattern() {
        assert!(Rule::line("broken", "(", ComplexityClass::Linear).is_err());
    }
}
