use codeviz_common::ComplexityClass;
use codeviz_engine::{generate, GrowthCurveGenerator, DEFAULT_HORIZON};
use tracing::info;

#[test]
fn test_linear_curve_of_ten() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let points = generate(ComplexityClass::Linear, 10);
    assert_eq!(points.len(), 10);
    for (i, point) in points.iter().enumerate() {
        assert_eq!(point.actual_operations, (i + 1) as f64);
    }
}

#[test]
fn test_logarithmic_starts_at_zero() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let points = generate(ComplexityClass::Logarithmic, 1);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].actual_operations, 0.0);
}

#[test]
fn test_zero_horizon_is_empty() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    assert!(generate(ComplexityClass::Quadratic, 0).is_empty());
    assert!(GrowthCurveGenerator::new(0).generate(ComplexityClass::Linear).is_empty());
}

#[test]
fn test_reference_columns_match_their_class() {
    codeviz_common::logging::ensure_test_logging(None);
    info!("Running test");
    let generator = GrowthCurveGenerator::default();
    assert_eq!(generator.horizon(), DEFAULT_HORIZON);

    for class in ComplexityClass::ALL {
        let curve = generator.generate(class);
        assert_eq!(curve.series(class), curve.actual(), "{class}");
    }
}
