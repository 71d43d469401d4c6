//! Penalty-adjusted net calculation.

/// Compute the net for one subject.
///
/// net = max(0, correct - incorrect / penalty_divisor)
///
/// The result keeps full precision; round with [`round2`] only when storing
/// or displaying, never between subjects.
pub fn net(correct: u32, incorrect: u32, penalty_divisor: f64) -> f64 {
    if penalty_divisor <= 0.0 || !penalty_divisor.is_finite() {
        // No penalty when the divisor is meaningless.
        return correct as f64;
    }
    (correct as f64 - incorrect as f64 / penalty_divisor).max(0.0)
}

/// Net rounded to two decimals.
pub fn rounded_net(correct: u32, incorrect: u32, penalty_divisor: f64) -> f64 {
    round2(net(correct, incorrect, penalty_divisor))
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of several nets, rounded once at the end.
pub fn total_net<I>(nets: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    round2(nets.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_wrong_cancel_one_right_on_lgs() {
        assert_eq!(net(18, 3, 3.0), 17.0);
    }

    #[test]
    fn floors_at_zero() {
        assert_eq!(net(5, 20, 4.0), 0.0);
        assert_eq!(net(0, 40, 3.0), 0.0);
    }

    #[test]
    fn empty_attempt_is_zero() {
        assert_eq!(net(0, 0, 3.0), 0.0);
        assert_eq!(net(0, 0, 4.0), 0.0);
    }

    #[test]
    fn never_negative_and_monotonic() {
        for divisor in [3.0, 4.0] {
            for c in 0..=40u32 {
                for w in 0..=40u32 {
                    let value = net(c, w, divisor);
                    assert!(value >= 0.0, "net({c}, {w}, {divisor}) = {value}");
                    assert!(net(c + 1, w, divisor) >= value);
                    assert!(net(c, w + 1, divisor) <= value);
                }
            }
        }
    }

    #[test]
    fn rounding_only_at_the_end() {
        // Six subjects each at 9.666..., rounded per subject would give 58.02.
        let nets = std::iter::repeat(net(10, 1, 3.0)).take(6);
        assert_eq!(total_net(nets), 58.0);
        assert_eq!(rounded_net(10, 1, 3.0), 9.67);
    }
}
