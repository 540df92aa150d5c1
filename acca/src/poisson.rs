//! Poisson mass and tail functions.

use crate::factorial::Factorial;

/// Probability of exactly `k` events given the rate `lambda`.
#[inline]
pub fn univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    lambda.powi(k as i32) * f64::exp(-lambda) / factorial.get(k) as f64
}

/// Cumulative probability of at most `k` events given the rate `lambda`.
///
/// Terms are accumulated by recurrence rather than through a factorial, so `k` is not bounded by
/// the factorial lookup.
pub fn cdf(k: u16, lambda: f64) -> f64 {
    let mut term = f64::exp(-lambda);
    let mut sum = term;
    for i in 1..=k {
        term *= lambda / i as f64;
        sum += term;
    }
    sum
}

/// Probability of strictly more than `k` events given the rate `lambda`.
#[inline]
pub fn survival(k: u16, lambda: f64) -> f64 {
    1.0 - cdf(k, lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorial::{Calculator, Lookup};
    use assert_float_eq::*;

    #[test]
    pub fn test_univariate() {
        assert_float_relative_eq!(
            0.36787944117144233,
            univariate(0, 1.0, &Calculator::default())
        );
        assert_float_relative_eq!(
            0.36787944117144233,
            univariate(1, 1.0, &Calculator::default())
        );
        assert_float_relative_eq!(
            0.18393972058572117,
            univariate(2, 1.0, &Calculator::default())
        );
        assert_float_relative_eq!(
            0.0820849986238988,
            univariate(0, 2.5, &Lookup::default())
        );
        assert_float_relative_eq!(0.205212496559747, univariate(1, 2.5, &Lookup::default()));
        assert_float_relative_eq!(
            0.25651562069968376,
            univariate(2, 2.5, &Lookup::default())
        );
    }

    #[test]
    pub fn test_cdf() {
        assert_float_relative_eq!(0.36787944117144233, cdf(0, 1.0));
        assert_float_relative_eq!(0.5438131158833295, cdf(2, 2.5));
        assert_float_relative_eq!(0.45792971447185227, cdf(9, 10.0));
        assert_float_relative_eq!(0.8576135530957782, cdf(5, 3.5));
    }

    #[test]
    pub fn cdf_agrees_with_summed_mass() {
        let factorial = Lookup::default();
        let summed = (0..=6).map(|k| univariate(k, 1.7, &factorial)).sum::<f64>();
        assert_float_relative_eq!(summed, cdf(6, 1.7), 1e-12);
    }

    #[test]
    pub fn test_survival() {
        assert_float_relative_eq!(0.463367332099215, survival(3, 3.5), 1e-9);
        assert_float_absolute_eq!(0.0, survival(200, 2.0), 1e-12);
    }
}
