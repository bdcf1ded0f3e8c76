//! Money formatting helpers

/// Cents to dollars
pub fn cents_to_dollars(cents: f64) -> f64 {
    cents / 100.0
}

/// Human-readable dollar amount. Sub-cent amounts keep extra precision.
pub fn format_cents(cents: f64) -> String {
    let dollars = cents_to_dollars(cents);
    if dollars != 0.0 && dollars.abs() < 0.01 {
        format!("${:.6}", dollars)
    } else {
        format!("${:.2}", dollars)
    }
}
