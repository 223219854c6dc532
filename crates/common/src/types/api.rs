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

//! Wire types exchanged with the execution service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{ExecutionStep, Language, Trace};

/// Request body shared by the run, analyze and trace endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CodeRequest<'a> {
    /// Program source text
    pub code: &'a str,
    /// Display language of the program
    pub language: Language,
}

/// Response of the run endpoint
///
/// Output and error are not exclusive: a program may print and then fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output
    #[serde(default)]
    pub output: Option<String>,
    /// Error reported by the service or the program
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of the analyze endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    /// Complexity label, e.g. `O(n²)`
    #[serde(default)]
    pub complexity: String,
    /// Numeric metrics such as loop counts
    #[serde(default, deserialize_with = "numeric_metrics")]
    pub metrics: Option<BTreeMap<String, f64>>,
    /// Analysis failure reported by the service
    #[serde(default)]
    pub error: Option<String>,
}

/// Keep only numeric metrics; services also report lists (e.g. variable names)
fn numeric_metrics<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(|metrics| {
        metrics.into_iter().filter_map(|(name, value)| Some((name, value.as_f64()?))).collect()
    }))
}

/// Response of the trace endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceResponse {
    /// Recorded steps
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
}

impl From<TraceResponse> for Trace {
    fn from(response: TraceResponse) -> Self {
        response.steps.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(CodeRequest { code: "print(1)", language: Language::Cpp })
            .unwrap();
        assert_eq!(body, serde_json::json!({"code": "print(1)", "language": "cpp"}));
    }

    #[test]
    fn test_execution_result_output_and_error_coexist() {
        let result: ExecutionResult =
            serde_json::from_str(r#"{"output": "partial", "error": "boom"}"#).unwrap();
        assert_eq!(result.output.as_deref(), Some("partial"));
        assert_eq!(result.error.as_deref(), Some("boom"));

        let empty: ExecutionResult = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExecutionResult::default());
    }

    #[test]
    fn test_analysis_drops_non_numeric_metrics() {
        let analysis: CodeAnalysis = serde_json::from_str(
            r#"{"complexity": "O(n)", "metrics": {"loops": 1, "variables": ["i", "n"]}}"#,
        )
        .unwrap();
        let metrics = analysis.metrics.unwrap();
        assert_eq!(metrics.get("loops"), Some(&1.0));
        assert!(!metrics.contains_key("variables"));
    }

    #[test]
    fn test_analysis_error_only() {
        let analysis: CodeAnalysis =
            serde_json::from_str(r#"{"error": "invalid syntax"}"#).unwrap();
        assert!(analysis.complexity.is_empty());
        assert!(analysis.metrics.is_none());
        assert_eq!(analysis.error.as_deref(), Some("invalid syntax"));
    }

    #[test]
    fn test_trace_response_into_trace() {
        let response: TraceResponse =
            serde_json::from_str(r#"{"steps": [{"line": 1, "description": "init"}]}"#).unwrap();
        let trace: Trace = response.into();
        assert_eq!(trace.len(), 1);
    }
}
