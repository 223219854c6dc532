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

//! Offline backend
//!
//! Used when no execution service is available. Nothing is executed: the
//! run yields no output, the analysis comes from the local classifier and
//! the trace is a canned walkthrough.

use codeviz_common::{CodeAnalysis, ExecutionResult, ExecutionStep, Language, Trace};
use codeviz_engine::ComplexityClassifier;
use tracing::debug;

use super::{ExecutionBackend, TransportError};

/// Backend answering every request locally
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    classifier: ComplexityClassifier,
}

impl MockBackend {
    /// Create a new offline backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionBackend for MockBackend {
    async fn execute(
        &self,
        source: &str,
        language: Language,
    ) -> Result<ExecutionResult, TransportError> {
        debug!("Offline run of {} bytes of {}", source.len(), language);
        Ok(ExecutionResult::default())
    }

    async fn analyze(
        &self,
        source: &str,
        _language: Language,
    ) -> Result<CodeAnalysis, TransportError> {
        let complexity = self.classifier.classify(source);
        Ok(CodeAnalysis {
            complexity: complexity.time.to_string(),
            metrics: Some(self.classifier.metrics(source).to_map()),
            error: None,
        })
    }

    async fn trace(&self, source: &str, language: Language) -> Result<Trace, TransportError> {
        Ok(mock_trace(source, language))
    }
}

/// Canned walkthrough of a program
///
/// Python sources iterating over `range` get the first steps of the
/// multiplication table for `n = 3`; anything else gets a two-step default.
pub fn mock_trace(source: &str, language: Language) -> Trace {
    if language == Language::Python && source.contains("range") {
        return vec![
            ExecutionStep::new(2, "Input request")
                .with_variable("n", "3", "int")
                .with_output("Enter a number (n): 3"),
            ExecutionStep::new(4, "First iteration of outer loop")
                .with_variable("n", "3", "int")
                .with_variable("i", "1", "int")
                .with_output("Table of 1:"),
            ExecutionStep::new(6, "Inner loop (i=1, j=1)")
                .with_variable("n", "3", "int")
                .with_variable("i", "1", "int")
                .with_variable("j", "1", "int")
                .with_output("1 x 1 = 1"),
        ]
        .into();
    }

    vec![
        ExecutionStep::new(1, "Code initialization").with_output(""),
        ExecutionStep::new(2, "Variables definition")
            .with_variable("sample", "example", "string")
            .with_output(""),
    ]
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_run_is_empty() {
        let result = MockBackend::new().execute("print(1)", Language::Python).await.unwrap();
        assert_eq!(result, ExecutionResult::default());
    }

    #[tokio::test]
    async fn test_offline_analysis_uses_classifier() {
        let analysis = MockBackend::new()
            .analyze(Language::Java.example_program(), Language::Java)
            .await
            .unwrap();
        assert_eq!(analysis.complexity, "O(n²)");
        let metrics = analysis.metrics.unwrap();
        assert_eq!(metrics["loops"], 2.0);
        assert_eq!(metrics["nested_loops"], 1.0);
    }

    #[test]
    fn test_mock_trace_shapes() {
        let table = mock_trace(Language::Python.example_program(), Language::Python);
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].output.as_deref(), Some("1 x 1 = 1"));

        // only Python sources get the table walkthrough
        let default = mock_trace(Language::Java.example_program(), Language::Java);
        assert_eq!(default.len(), 2);
        assert_eq!(default[1].variables["sample"].ty, "string");
    }
}
