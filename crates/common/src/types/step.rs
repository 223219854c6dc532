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

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::HashMap, ops::Deref};

/// A live variable captured at one execution step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Display string of the value
    #[serde(deserialize_with = "display_string")]
    pub value: String,
    /// Type name as reported by the producer (e.g. `int`)
    #[serde(rename = "type")]
    pub ty: String,
}

impl Variable {
    /// Create a new variable snapshot
    pub fn new(value: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { value: value.into(), ty: ty.into() }
    }
}

/// Producers may send raw JSON numbers or booleans as values; keep their textual form
fn display_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Source lines are numbered from 1
fn line_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match usize::deserialize(deserializer)? {
        0 => Err(serde::de::Error::custom("line numbers start at 1")),
        line => Ok(line),
    }
}

/// One snapshot in a step-by-step walkthrough of a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-based source line executed at this step
    #[serde(rename = "line", deserialize_with = "line_number")]
    pub line_number: usize,
    /// Human readable explanation of the step
    pub description: String,
    /// Variables in scope, by name
    #[serde(default)]
    pub variables: HashMap<String, Variable>,
    /// Output emitted at this step, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ExecutionStep {
    /// Create a step with no variables and no output
    pub fn new(line_number: usize, description: impl Into<String>) -> Self {
        Self {
            line_number,
            description: description.into(),
            variables: HashMap::new(),
            output: None,
        }
    }

    /// Add a variable snapshot
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        self.variables.insert(name.into(), Variable::new(value, ty));
        self
    }

    /// Attach emitted output
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Variables sorted by name, for stable rendering
    pub fn sorted_variables(&self) -> Vec<(&String, &Variable)> {
        let mut vars: Vec<_> = self.variables.iter().collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }
}

/// Ordered, immutable sequence of execution steps produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<ExecutionStep>,
}

impl Trace {
    /// Create a new empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the trace is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Deref for Trace {
    type Target = [ExecutionStep];

    fn deref(&self) -> &Self::Target {
        &self.steps
    }
}

impl From<Vec<ExecutionStep>> for Trace {
    fn from(steps: Vec<ExecutionStep>) -> Self {
        Self { steps }
    }
}

impl FromIterator<ExecutionStep> for Trace {
    fn from_iter<I: IntoIterator<Item = ExecutionStep>>(iter: I) -> Self {
        Self { steps: iter.into_iter().collect() }
    }
}

impl IntoIterator for Trace {
    type Item = ExecutionStep;
    type IntoIter = std::vec::IntoIter<ExecutionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a ExecutionStep;
    type IntoIter = std::slice::Iter<'a, ExecutionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_wire_format() {
        let json = r#"{
            "line": 4,
            "description": "First iteration of outer loop",
            "variables": {"n": {"value": "3", "type": "int"}, "i": {"value": 1, "type": "int"}},
            "output": "Table of 1:"
        }"#;

        let step: ExecutionStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.line_number, 4);
        assert_eq!(step.variables["n"], Variable::new("3", "int"));
        // numeric values keep their textual form
        assert_eq!(step.variables["i"].value, "1");
        assert_eq!(step.output.as_deref(), Some("Table of 1:"));
    }

    #[test]
    fn test_step_optional_fields() {
        let step: ExecutionStep =
            serde_json::from_str(r#"{"line": 1, "description": "Code initialization"}"#).unwrap();
        assert!(step.variables.is_empty());
        assert!(step.output.is_none());

        let json = serde_json::to_value(&step).unwrap();
        assert!(json.get("output").is_none());
        assert_eq!(json["line"], 1);
    }

    #[test]
    fn test_step_rejects_line_zero() {
        let err = serde_json::from_str::<ExecutionStep>(r#"{"line": 0, "description": "bad"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("line numbers start at 1"), "{err}");

        let trace = serde_json::from_str::<Trace>(
            r#"[{"line": 1, "description": "ok"}, {"line": 0, "description": "bad"}]"#,
        );
        assert!(trace.is_err());
    }

    #[test]
    fn test_sorted_variables() {
        let step = ExecutionStep::new(6, "Inner loop")
            .with_variable("j", "1", "int")
            .with_variable("i", "1", "int")
            .with_variable("n", "3", "int");

        let names: Vec<_> = step.sorted_variables().into_iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["i", "j", "n"]);
    }

    #[test]
    fn test_trace_is_transparent_sequence() {
        let trace: Trace = serde_json::from_str(
            r#"[{"line": 1, "description": "a"}, {"line": 2, "description": "b"}]"#,
        )
        .unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].description, "b");
        assert!(Trace::new().is_empty());
    }
}
