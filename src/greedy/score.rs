//! Greedy item score and score statistics.

use crate::catalog::{Dataset, Item};
use crate::constraints::EPSILON;

/// Greedy attractiveness of an item: `profit / max(cogs, eps) * rating`.
///
/// Zero-cost items are scored against `eps` rather than skipped, so they
/// rank very high instead of producing an infinity or NaN.
#[inline]
pub fn score(item: &Item) -> f64 {
    item.profit / item.cogs.max(EPSILON) * item.rating
}

/// Scores of every item, indexed by dataset position.
pub fn scores(dataset: &Dataset) -> Vec<f64> {
    dataset.items().iter().map(score).collect()
}

/// The `q`-quantile of `values` with linear interpolation between the two
/// closest ranks. `q` is clamped to `[0, 1]`. Returns `None` for empty
/// input or a non-finite `q`.
///
/// # Examples
///
/// ```
/// use u_assort::greedy::quantile;
///
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(2.5));
/// assert_eq!(quantile(&[3.0, 1.0, 2.0], 1.0), Some(3.0));
/// ```
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !q.is_finite() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formula() {
        let item = Item::new(1u64, "Drinks", 5.0, 8.0, 4.7);
        assert!((score(&item) - 8.0 / 5.0 * 4.7).abs() < 1e-12);
    }

    #[test]
    fn test_score_zero_cogs_uses_epsilon() {
        let item = Item::new(1u64, "Free", 0.0, 2.0, 3.0);
        let s = score(&item);
        assert!(s.is_finite());
        assert!((s - 2.0 / EPSILON * 3.0).abs() / s < 1e-12);
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(quantile(&v, 0.0), Some(10.0));
        assert_eq!(quantile(&v, 0.5), Some(30.0));
        assert_eq!(quantile(&v, 1.0), Some(50.0));
        let q = quantile(&v, 0.1).unwrap();
        assert!((q - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_empty() {
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_quantile_non_finite_q() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(quantile(&v, f64::NAN), None);
        assert_eq!(quantile(&v, f64::INFINITY), None);
        assert_eq!(quantile(&v, 7.0), Some(3.0));
    }
}
