//! Custom assertions

/// Assert two cent amounts are equal within floating point noise
#[track_caller]
pub fn assert_cents_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {} cents, got {}",
        expected,
        actual
    );
}
