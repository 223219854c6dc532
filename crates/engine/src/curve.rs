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

//! Synthetic growth curves
//!
//! A growth curve samples the theoretical operation count of a complexity
//! class for input sizes `1..=horizon`, next to the same samples for every
//! other known class so they can be plotted together.

use codeviz_common::{ComplexityClass, GrowthCurvePoint};
use std::ops::Deref;

/// Number of samples produced when no horizon is configured
pub const DEFAULT_HORIZON: u32 = 10;

/// Theoretical operation count of `class` at input size `n`
///
/// `log2` is taken as zero for `n <= 1`, so every series starts at or
/// above zero and never decreases.
pub fn theoretical_operations(class: ComplexityClass, n: u32) -> f64 {
    let n = f64::from(n);
    match class {
        ComplexityClass::Constant => 1.0,
        ComplexityClass::Logarithmic if n <= 1.0 => 0.0,
        ComplexityClass::Logarithmic => n.log2(),
        ComplexityClass::Linear => n,
        ComplexityClass::Quadratic => n * n,
    }
}

/// Sample `class` and all reference classes for input sizes `1..=horizon`
pub fn generate(class: ComplexityClass, horizon: u32) -> Vec<GrowthCurvePoint> {
    (1..=horizon)
        .map(|n| GrowthCurvePoint {
            input_size: n,
            actual_operations: theoretical_operations(class, n),
            reference_series: ComplexityClass::ALL
                .into_iter()
                .map(|reference| (reference, theoretical_operations(reference, n)))
                .collect(),
        })
        .collect()
}

/// Produces [`GrowthCurve`]s with a fixed horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthCurveGenerator {
    horizon: u32,
}

impl Default for GrowthCurveGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON)
    }
}

impl GrowthCurveGenerator {
    /// Create a generator sampling `1..=horizon`
    pub fn new(horizon: u32) -> Self {
        Self { horizon }
    }

    /// Number of samples per curve
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Build the curve of `class`
    pub fn generate(&self, class: ComplexityClass) -> GrowthCurve {
        GrowthCurve { class, points: generate(class, self.horizon) }
    }
}

/// Samples of one class, with every reference class alongside
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthCurve {
    class: ComplexityClass,
    points: Vec<GrowthCurvePoint>,
}

impl GrowthCurve {
    /// An empty curve, shown before anything was classified
    pub fn empty(class: ComplexityClass) -> Self {
        Self { class, points: Vec::new() }
    }

    /// Class whose operation count is in `actual_operations`
    pub fn class(&self) -> ComplexityClass {
        self.class
    }

    /// All samples in input size order
    pub fn points(&self) -> &[GrowthCurvePoint] {
        &self.points
    }

    /// `(input size, operations)` pairs of the curve's own class
    pub fn actual(&self) -> Vec<(u32, f64)> {
        self.points.iter().map(|p| (p.input_size, p.actual_operations)).collect()
    }

    /// `(input size, operations)` pairs of one reference class
    pub fn series(&self, class: ComplexityClass) -> Vec<(u32, f64)> {
        self.points.iter().filter_map(|p| Some((p.input_size, p.reference(class)?))).collect()
    }
}

impl Deref for GrowthCurve {
    type Target = [GrowthCurvePoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_matches_horizon() {
        for class in ComplexityClass::ALL {
            for horizon in [0, 1, 10, 64] {
                assert_eq!(generate(class, horizon).len(), horizon as usize);
            }
        }
    }

    #[test]
    fn test_linear_values() {
        let points = generate(ComplexityClass::Linear, 10);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.input_size as usize, i + 1);
            assert_eq!(point.actual_operations, (i + 1) as f64);
        }
    }

    #[test]
    fn test_log_of_one_is_zero() {
        let points = generate(ComplexityClass::Logarithmic, 1);
        assert_eq!(points[0].actual_operations, 0.0);
        assert_eq!(theoretical_operations(ComplexityClass::Logarithmic, 8), 3.0);
        assert_eq!(theoretical_operations(ComplexityClass::Logarithmic, 0), 0.0);
    }

    #[test]
    fn test_series_non_negative_and_monotone() {
        for class in ComplexityClass::ALL {
            let points = generate(class, 32);
            for pair in points.windows(2) {
                assert!(pair[0].actual_operations >= 0.0);
                assert!(pair[1].actual_operations >= pair[0].actual_operations, "{class}");
            }
        }
    }

    #[test]
    fn test_reference_series_carries_every_class() {
        let curve = GrowthCurveGenerator::new(4).generate(ComplexityClass::Constant);
        assert_eq!(curve.len(), 4);
        assert_eq!(curve.class(), ComplexityClass::Constant);
        assert!(curve.iter().all(|p| p.reference_series.len() == ComplexityClass::ALL.len()));
        assert_eq!(
            curve.series(ComplexityClass::Quadratic),
            vec![(1, 1.0), (2, 4.0), (3, 9.0), (4, 16.0)]
        );
        assert_eq!(curve.actual(), vec![(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)]);
    }

    #[test]
    fn test_default_horizon() {
        assert_eq!(GrowthCurveGenerator::default().horizon(), DEFAULT_HORIZON);
        assert!(GrowthCurve::empty(ComplexityClass::Linear).is_empty());
    }
}
