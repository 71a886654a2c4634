use crate::{CoreError, CoreResult};

/// Currency codes whose smallest unit equals the major unit, so the
/// processor expects whole amounts rather than hundredths.
const ZERO_DECIMAL: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "lkr", "mga", "pyg", "rwf", "ugx", "vnd",
    "vuv", "xaf", "xof", "xpf",
];

pub fn is_zero_decimal(currency: &str) -> bool {
    let code = currency.to_ascii_lowercase();
    ZERO_DECIMAL.contains(&code.as_str())
}

/// Convert a customer-facing decimal price into the processor's minimal-unit
/// integer amount. This is the single conversion used by both the checkout
/// path and any reconciliation-side audit of an amount.
pub fn minor_units(price: f64, currency: &str) -> CoreResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::InvalidAmount(format!(
            "price {} cannot be charged",
            price
        )));
    }

    let scaled = if is_zero_decimal(currency) {
        price
    } else {
        price * 100.0
    };

    // f64::round is round-half-away-from-zero, matching currency rounding.
    Ok(scaled.round() as i64)
}
