//! Testing helpers.

/// Asserts that `prob` is a valid probability, naming `what` in the failure message.
pub fn assert_probability(prob: f64, what: impl std::fmt::Display) {
    assert!(
        (0.0..=1.0).contains(&prob),
        "probability {prob} of {what} outside [0, 1]"
    );
}

/// Asserts that `values` never increase.
pub fn assert_non_increasing(values: &[f64]) {
    for window in values.windows(2) {
        assert!(
            window[0] >= window[1],
            "{} followed by larger {} in {values:?}",
            window[0],
            window[1]
        );
    }
}
