//! Period-over-period percentage changes.
//!
//! Missing inputs are passed as NaN; both functions absorb NaN and
//! division by zero instead of propagating them.

/// Percent change from `previous` to `current`.
///
/// Returns 0 when `previous` is 0 or NaN, or the result is not finite.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    let change = (current - previous) / previous * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

/// Change over the last period and its percent change against the period before.
///
/// Returns `(current_change, percent)` where
/// `current_change = now - one_day_ago` and the percent compares it with
/// `one_day_ago - two_days_ago`. When the percent is NaN or infinite the
/// result is `(current_change, 0.0)`.
///
/// A negative previous change flips the sign of the percent. That is kept
/// as-is; consumers display it unchanged.
pub fn two_day_percent_change(now: f64, one_day_ago: f64, two_days_ago: f64) -> (f64, f64) {
    let current_change = now - one_day_ago;
    let previous_change = one_day_ago - two_days_ago;

    let adjusted = (current_change - previous_change) / previous_change * 100.0;

    if adjusted.is_finite() {
        (current_change, adjusted)
    } else {
        (current_change, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_previous_is_zero() {
        for current in [0.0, 1.0, -5.0, 1e18] {
            assert_eq!(percent_change(current, 0.0), 0.0);
        }
        assert_eq!(percent_change(10.0, f64::NAN), 0.0);
        assert_eq!(percent_change(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
    }

    #[test]
    fn test_two_day_zero_previous_change_falls_back() {
        assert_eq!(two_day_percent_change(300.0, 200.0, 200.0), (100.0, 0.0));
        assert_eq!(two_day_percent_change(200.0, 200.0, 200.0), (0.0, 0.0));
    }

    #[test]
    fn test_two_day_percent_change() {
        // 200 traded in each of the last two days
        assert_eq!(two_day_percent_change(1000.0, 800.0, 600.0), (200.0, 0.0));
        // 300 today vs 200 yesterday
        assert_eq!(two_day_percent_change(1100.0, 800.0, 600.0), (300.0, 50.0));
    }

    #[test]
    fn test_two_day_missing_history() {
        let (change, percent) = two_day_percent_change(1000.0, 800.0, f64::NAN);
        assert_eq!(change, 200.0);
        assert_eq!(percent, 0.0);

        let (change, percent) = two_day_percent_change(1000.0, f64::NAN, f64::NAN);
        assert!(change.is_nan());
        assert_eq!(percent, 0.0);
    }
}
