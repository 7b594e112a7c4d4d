//! Exponential smoothing shared by MACD and RSI.
//!
//! k = 2/(n+1), EMA[0] = C[0], then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: the first (n-1) points have no value, though the recursion runs
//! through them.

/// EMA over a raw sequence, masked until `period` inputs have been seen.
/// Output has the same length as the input.
pub(crate) fn ema_values(input: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; input.len()];
    }
    let k = 2.0 / (period as f64 + 1.0);
    smoothed(input, k, period)
}

/// Recursive smoothing `s[i] = x[i]*alpha + s[i-1]*(1-alpha)` from `s[0] = x[0]`,
/// reported from index `min_periods - 1` on.
pub(crate) fn smoothed(input: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(input.len());
    let mut state = 0.0;
    for (i, &x) in input.iter().enumerate() {
        state = if i == 0 {
            x
        } else {
            x * alpha + state * (1.0 - alpha)
        };
        out.push((i + 1 >= min_periods).then_some(state));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let out = ema_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(out[0].is_none());
        assert!(out[1].is_none());
        assert!(out[2].is_some());
        assert!(out[4].is_some());
    }

    #[test]
    fn ema_period_1_tracks_input() {
        assert_eq!(
            ema_values(&[10.0, 20.0, 30.0], 1),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn ema_recursion_starts_at_first_input() {
        // k = 0.5: 10, 15, 22.5 -> first reported value 22.5
        let out = ema_values(&[10.0, 20.0, 30.0], 3);
        assert_eq!(out[2], Some(22.5));
    }

    #[test]
    fn ema_recursive_calculation() {
        let out = ema_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let ema_2 = 22.5;
        let ema_3 = 40.0 * k + ema_2 * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((out[3].unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((out[4].unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_inputs() {
        let out = ema_values(&[100.0; 5], 3);
        for v in &out[2..] {
            assert!((v.unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_period_0_has_no_values() {
        let out = ema_values(&[10.0, 20.0], 0);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn ema_non_integer_weights() {
        // k = 2/3: 1, 5/3, 23/9
        let out = ema_values(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 5.0 / 3.0).abs() < 1e-12);
        assert!((out[2].unwrap() - 23.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn smoothed_masks_until_min_periods() {
        let out = smoothed(&[4.0, 0.0, 0.0], 0.5, 2);
        assert_eq!(out, vec![None, Some(2.0), Some(1.0)]);
        assert!(smoothed(&[], 0.5, 1).is_empty());
    }
}
