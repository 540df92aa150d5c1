//! Synthetic pricing of single outcomes.
//!
//! Prices here are not sourced from a bookmaker: they are fair odds shortened by a fixed margin,
//! standing in for a bookmaker's overround.

use serde::{Deserialize, Serialize};

/// Price returned for outcomes that cannot be priced (zero or negative probability).
pub const MIN_PRICE: f64 = 1.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Fraction by which fair odds are shortened, e.g. `0.05`.
    pub value: f64,

    /// Decimal places retained in the quoted price.
    pub precision: u8,
}
impl Margin {
    /// Decimal odds for an outcome of probability `prob`: `(1 / prob) × (1 − margin)`, rounded to
    /// the configured precision.
    pub fn price(&self, prob: f64) -> f64 {
        if prob <= 0.0 || !prob.is_finite() {
            return MIN_PRICE;
        }
        round(1.0 / prob * (1.0 - self.value), self.precision)
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            value: 0.05,
            precision: 2,
        }
    }
}

pub fn round(value: f64, precision: u8) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// Decimal odds of a combination of independent legs: the product of the leg odds.
pub fn combined_price(prices: impl IntoIterator<Item = f64>) -> f64 {
    prices.into_iter().product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn price_with_default_margin() {
        let margin = Margin::default();
        assert_eq!(1.9, margin.price(0.5));
        assert_eq!(1.19, margin.price(0.8));
        assert_eq!(2.38, margin.price(0.4));
        assert_eq!(0.95, margin.price(1.0));
    }

    #[test]
    fn price_fair() {
        let margin = Margin {
            value: 0.0,
            precision: 2,
        };
        assert_eq!(2.0, margin.price(0.5));
        assert_eq!(3.33, margin.price(0.3));
    }

    #[test]
    fn price_unpriceable() {
        let margin = Margin::default();
        assert_eq!(MIN_PRICE, margin.price(0.0));
        assert_eq!(MIN_PRICE, margin.price(-0.1));
        assert_eq!(MIN_PRICE, margin.price(f64::NAN));
    }

    #[test]
    fn price_precision() {
        let margin = Margin {
            value: 0.05,
            precision: 4,
        };
        assert_float_absolute_eq!(1.1176, margin.price(0.85), 1e-9);
    }

    #[test]
    fn combined() {
        assert_float_relative_eq!(1.9 * 1.19 * 2.38, combined_price([1.9, 1.19, 2.38]));
        assert_eq!(1.0, combined_price(std::iter::empty()));
    }
}
