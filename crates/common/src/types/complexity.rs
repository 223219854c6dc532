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
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Asymptotic growth class of an algorithm's operation count
///
/// Classes are ordered from slowest to fastest growing, so the derived `Ord`
/// can be used to keep reference series in a stable order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComplexityClass {
    /// `O(1)`
    #[display("O(1)")]
    Constant,
    /// `O(log n)`
    #[display("O(log n)")]
    Logarithmic,
    /// `O(n)`
    #[display("O(n)")]
    Linear,
    /// `O(n²)`
    #[display("O(n²)")]
    Quadratic,
}

impl ComplexityClass {
    /// Every known class, in growth order
    pub const ALL: [Self; 4] = [Self::Constant, Self::Logarithmic, Self::Linear, Self::Quadratic];

    /// The display label, e.g. `O(log n)`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::Linear => "O(n)",
            Self::Quadratic => "O(n²)",
        }
    }
}

/// Error returned when a label does not name a known complexity class
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown complexity class '{0}'")]
pub struct UnknownComplexity(pub String);

impl FromStr for ComplexityClass {
    type Err = UnknownComplexity;

    /// Parses labels leniently: whitespace and case are ignored and `^2` is
    /// accepted for `²`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();

        match normalized.replace("^2", "²").as_str() {
            "o(1)" => Ok(Self::Constant),
            "o(logn)" => Ok(Self::Logarithmic),
            "o(n)" => Ok(Self::Linear),
            "o(n²)" | "o(n*n)" => Ok(Self::Quadratic),
            _ => Err(UnknownComplexity(s.to_string())),
        }
    }
}

impl Serialize for ComplexityClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ComplexityClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

/// Time and space classes derived for one source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Complexity {
    /// Time complexity
    pub time: ComplexityClass,
    /// Space complexity
    pub space: ComplexityClass,
}

impl Complexity {
    /// Create a new time/space pair
    pub fn new(time: ComplexityClass, space: ComplexityClass) -> Self {
        Self { time, space }
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::new(ComplexityClass::Constant, ComplexityClass::Constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_label() {
        for class in ComplexityClass::ALL {
            assert_eq!(class.to_string(), class.label());
        }
    }

    #[test]
    fn test_parse_lenient_labels() {
        assert_eq!("O(1)".parse(), Ok(ComplexityClass::Constant));
        assert_eq!("o( LOG N )".parse(), Ok(ComplexityClass::Logarithmic));
        assert_eq!("O(n)".parse(), Ok(ComplexityClass::Linear));
        assert_eq!("O(n²)".parse(), Ok(ComplexityClass::Quadratic));
        assert_eq!("O(n^2)".parse(), Ok(ComplexityClass::Quadratic));
    }

    #[test]
    fn test_parse_rejects_unknown_classes() {
        let err = "O(2^n)".parse::<ComplexityClass>().unwrap_err();
        assert_eq!(err, UnknownComplexity("O(2^n)".to_string()));
        assert!("Unknown".parse::<ComplexityClass>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Complexity::new(
            ComplexityClass::Quadratic,
            ComplexityClass::Linear,
        ))
        .unwrap();
        assert_eq!(json, r#"{"time":"O(n²)","space":"O(n)"}"#);

        let back: Complexity =
            serde_json::from_str(r#"{"time":"O(log n)","space":"O(1)"}"#).unwrap();
        assert_eq!(back.time, ComplexityClass::Logarithmic);
        assert_eq!(back.space, ComplexityClass::Constant);
    }
}
