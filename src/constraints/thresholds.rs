//! Run-wide thresholds derived from a dataset.

use crate::catalog::Dataset;

/// Default fraction of the per-category cogs ceiling granted as budget.
pub const DEFAULT_BUDGET_ALPHA: f64 = 0.7;

/// Default margin added to the dataset mean rating.
pub const DEFAULT_RATING_BUFFER: f64 = 0.1;

/// Spending cap `B`: the sum over categories of the highest cogs in that
/// category, scaled by `alpha`.
///
/// Non-decreasing in `alpha` as long as cogs are non-negative.
///
/// # Examples
///
/// ```
/// use u_assort::catalog::{Dataset, Item};
/// use u_assort::constraints::compute_budget;
///
/// let ds = Dataset::new(vec![
///     Item::new(1u64, "Drinks", 5.0, 8.0, 4.7),
///     Item::new(2u64, "Snacks", 4.0, 6.5, 4.4),
///     Item::new(4u64, "Drinks", 4.5, 7.0, 4.1),
/// ]).unwrap();
/// assert!((compute_budget(&ds, 0.5) - 4.5).abs() < 1e-9);
/// ```
pub fn compute_budget(dataset: &Dataset, alpha: f64) -> f64 {
    dataset.max_cogs_per_category().iter().sum::<f64>() * alpha
}

/// Minimum mean rating `Rmin`: the dataset mean rating plus `buffer`.
pub fn compute_min_rating(dataset: &Dataset, buffer: f64) -> f64 {
    dataset.mean_rating() + buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    fn mini() -> Dataset {
        Dataset::new(vec![
            Item::new(1u64, "Drinks", 5.0, 8.0, 4.7),
            Item::new(2u64, "Snacks", 4.0, 6.5, 4.4),
            Item::new(3u64, "Fruits", 3.8, 5.2, 4.6),
            Item::new(4u64, "Drinks", 4.5, 7.0, 4.1),
            Item::new(5u64, "Snacks", 3.0, 5.8, 4.3),
        ])
        .unwrap()
    }

    #[test]
    fn test_budget_mini_dataset() {
        let b = compute_budget(&mini(), DEFAULT_BUDGET_ALPHA);
        assert!((b - 9.06).abs() < 1e-9, "got {b}");
    }

    #[test]
    fn test_min_rating_mini_dataset() {
        let r = compute_min_rating(&mini(), DEFAULT_RATING_BUFFER);
        assert!((r - 4.52).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn test_thresholds_monotone() {
        let ds = mini();
        let mut prev = f64::NEG_INFINITY;
        for step in 0..=10 {
            let b = compute_budget(&ds, step as f64 * 0.1);
            assert!(b + 1e-12 >= prev);
            prev = b;
        }
        assert!(compute_min_rating(&ds, 0.2) >= compute_min_rating(&ds, 0.1));
    }

    #[test]
    fn test_empty_dataset_thresholds() {
        let ds = Dataset::new(Vec::new()).unwrap();
        assert_eq!(compute_budget(&ds, 0.7), 0.0);
        assert_eq!(compute_min_rating(&ds, 0.1), 0.1);
    }
}
