//! Utilities for working with probabilities.

use std::ops::RangeInclusive;

pub const UNIT_RANGE: RangeInclusive<f64> = 0.0..=1.0;

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn product(&self) -> f64;
    fn all_finite(&self) -> bool;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn product(&self) -> f64 {
        self.iter().product()
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|value| value.is_finite())
    }
}

/// Forces `prob` into `[0, 1]`, absorbing summation drift. `NaN` maps to zero.
#[inline]
pub fn clamp(prob: f64) -> f64 {
    if prob.is_nan() {
        0.0
    } else {
        prob.clamp(*UNIT_RANGE.start(), *UNIT_RANGE.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn sum() {
        let data = [0.0, 0.1, 0.2];
        assert_f64_near!(0.3, data.sum(), 1);
    }

    #[test]
    fn product() {
        let data = [0.9, 0.85, 0.8];
        assert_float_relative_eq!(0.612, data.product());
        let empty: [f64; 0] = [];
        assert_eq!(1.0, empty.product());
    }

    #[test]
    fn all_finite() {
        assert!([0.0, 0.5].all_finite());
        assert!(![0.0, f64::NAN].all_finite());
        assert!(![f64::INFINITY].all_finite());
    }

    #[test]
    fn clamp_within_unit() {
        assert_eq!(0.0, clamp(-1e-12));
        assert_eq!(1.0, clamp(1.0 + 1e-12));
        assert_eq!(0.25, clamp(0.25));
        assert_eq!(0.0, clamp(f64::NAN));
    }
}
