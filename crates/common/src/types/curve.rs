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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ComplexityClass;

/// One sample of a synthetic growth curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthCurvePoint {
    /// Input size `n`, starting at 1
    pub input_size: u32,
    /// Operation count of the selected class at `n`
    pub actual_operations: f64,
    /// Theoretical value of every known class at `n`
    pub reference_series: BTreeMap<ComplexityClass, f64>,
}

impl GrowthCurvePoint {
    /// Reference value of one class at this point
    pub fn reference(&self, class: ComplexityClass) -> Option<f64> {
        self.reference_series.get(&class).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_class_labels_as_keys() {
        let point = GrowthCurvePoint {
            input_size: 2,
            actual_operations: 2.0,
            reference_series: BTreeMap::from([
                (ComplexityClass::Constant, 1.0),
                (ComplexityClass::Quadratic, 4.0),
            ]),
        };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["inputSize"], 2);
        assert_eq!(json["referenceSeries"]["O(n²)"], 4.0);

        let back: GrowthCurvePoint = serde_json::from_value(json).unwrap();
        assert_eq!(back.reference(ComplexityClass::Constant), Some(1.0));
        assert_eq!(back.reference(ComplexityClass::Linear), None);
    }
}
