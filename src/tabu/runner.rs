//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Derive budget and minimum rating from the full dataset
//! 2. Optionally secure-filter the dataset, then shortlist `k` candidates
//!    per category
//! 3. Build the initial selection (top-scored seed, else random draws)
//! 4. At each iteration:
//!    a. Evaluate every feasible single-category swap
//!    b. Select the most profitable non-tabu swap (or tabu swap satisfying
//!    aspiration)
//!    c. Apply it, lock the reverse swap, age the tabu list
//!    d. Update global best if improved
//! 5. Terminate after max iterations, an empty admissible neighborhood,
//!    optional stagnation, or cancellation
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.

use std::borrow::Cow;
use std::ops::ControlFlow;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::TabuConfig;
use super::search::TabuSearch;
use super::types::Termination;
use crate::catalog::{Dataset, ItemId};
use crate::constraints::{Constraints, Metrics};
use crate::error::AssortError;
use crate::greedy::{secure_filter, top_k_per_category, CandidateBuckets};

/// Seed used when the configuration does not provide one.
const DEFAULT_SEED: u64 = 42;

/// Result of a Tabu Search run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuResult {
    /// Best selection found, one id per explored category.
    pub selection: Vec<ItemId>,
    /// Profit, cogs and rating of the best selection.
    pub metrics: Metrics,
    /// Selection the search started from.
    pub initial_selection: Vec<ItemId>,
    /// Metrics of the initial selection.
    pub initial_metrics: Metrics,
    /// Total iterations executed.
    pub iterations: usize,
    /// Iteration at which the best solution was found.
    pub best_iteration: usize,
    /// Why the run stopped.
    pub termination: Termination,
    /// Best profit after each iteration.
    pub profit_history: Vec<f64>,
    /// Thresholds the run was held to.
    pub constraints: Constraints,
}

impl TabuResult {
    pub fn profit(&self) -> f64 {
        self.metrics.profit
    }

    pub fn cogs(&self) -> f64 {
        self.metrics.cogs
    }

    pub fn rating(&self) -> f64 {
        self.metrics.rating
    }
}

/// Tabu Search runner.
pub struct TabuRunner;

impl TabuRunner {
    /// Executes Tabu Search on the given dataset.
    ///
    /// Randomized construction draws from a [`StdRng`] seeded with
    /// `config.seed` (42 when unset), so identical inputs give identical
    /// results.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_assort::catalog::{Dataset, Item};
    /// use u_assort::tabu::{TabuConfig, TabuRunner};
    ///
    /// let ds = Dataset::new(vec![
    ///     Item::new(1u64, "Drinks", 5.0, 8.0, 4.7),
    ///     Item::new(2u64, "Snacks", 4.0, 6.5, 4.4),
    ///     Item::new(3u64, "Fruits", 3.8, 5.2, 4.6),
    ///     Item::new(4u64, "Drinks", 4.5, 7.0, 4.1),
    ///     Item::new(5u64, "Snacks", 3.0, 5.8, 4.3),
    /// ]).unwrap();
    /// let config = TabuConfig::default().with_budget(12.0).with_seed(7);
    /// let result = TabuRunner::run(&ds, &config).unwrap();
    /// assert!(result.constraints.is_feasible(&result.selection, &ds));
    /// ```
    pub fn run(dataset: &Dataset, config: &TabuConfig) -> Result<TabuResult, AssortError> {
        Self::run_with_cancel(dataset, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the search
    /// stops before the next iteration and returns the best selection
    /// found so far.
    pub fn run_with_cancel(
        dataset: &Dataset,
        config: &TabuConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TabuResult, AssortError> {
        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        Self::execute(dataset, config, &mut rng, cancel.as_deref())
    }

    /// Runs with a caller-supplied random source.
    pub fn run_with_rng<R: Rng>(
        dataset: &Dataset,
        config: &TabuConfig,
        rng: &mut R,
    ) -> Result<TabuResult, AssortError> {
        Self::execute(dataset, config, rng, None)
    }

    /// Runs on a prepared candidate pool and fixed thresholds, skipping
    /// threshold derivation and candidate reduction.
    pub fn run_on_buckets<R: Rng>(
        dataset: &Dataset,
        buckets: &CandidateBuckets,
        constraints: Constraints,
        config: &TabuConfig,
        rng: &mut R,
    ) -> Result<TabuResult, AssortError> {
        config.validate().map_err(AssortError::InvalidConfig)?;
        constraints.validate().map_err(AssortError::InvalidConfig)?;
        Self::search(dataset, buckets, constraints, config, rng, None)
    }

    #[tracing::instrument(level = "debug", name = "tabu_search", skip_all, fields(items = dataset.len()))]
    fn execute<R: Rng>(
        dataset: &Dataset,
        config: &TabuConfig,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<TabuResult, AssortError> {
        config.validate().map_err(AssortError::InvalidConfig)?;
        if dataset.is_empty() {
            return Err(AssortError::EmptyDataset);
        }

        // Thresholds always come from the full dataset.
        let constraints = config.constraints_for(dataset);
        constraints.validate().map_err(AssortError::InvalidConfig)?;

        let working: Cow<'_, Dataset> = match config.filter_quantile {
            Some(q) => Cow::Owned(secure_filter(dataset, q)?),
            None => Cow::Borrowed(dataset),
        };
        let buckets = top_k_per_category(&working, config.k_per_category)?;

        tracing::info!(
            items = dataset.len(),
            candidates = buckets.total_candidates(),
            categories = buckets.len(),
            budget = constraints.budget,
            min_rating = constraints.min_rating,
            "starting tabu search"
        );

        Self::search(dataset, &buckets, constraints, config, rng, cancel)
    }

    fn search<R: Rng>(
        dataset: &Dataset,
        buckets: &CandidateBuckets,
        constraints: Constraints,
        config: &TabuConfig,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<TabuResult, AssortError> {
        let mut search = TabuSearch::new(dataset, buckets, constraints, config, rng)?;
        tracing::info!(
            profit = search.initial_metrics().profit,
            cogs = search.initial_metrics().cogs,
            rating = search.initial_metrics().rating,
            "initial selection built"
        );

        let mut profit_history = Vec::with_capacity(config.max_iterations);
        let mut no_improve_count = 0;

        let termination = search.run_with(config.max_iterations, cancel, |search, mv| {
            let best_profit = search.best_metrics().profit;
            profit_history.push(best_profit);
            tracing::debug!(
                iteration = search.iteration(),
                category = %mv.category,
                removed = %mv.removed,
                added = %mv.added,
                profit = mv.profit,
                best_profit,
                "moved"
            );

            if mv.improved {
                no_improve_count = 0;
            } else {
                no_improve_count += 1;
            }

            // Stagnation check
            if config.max_no_improve.is_some_and(|limit| no_improve_count >= limit) {
                ControlFlow::Break(Termination::Stagnation)
            } else {
                ControlFlow::Continue(())
            }
        });
        if termination == Termination::NeighborhoodExhausted {
            tracing::debug!(
                iteration = search.iteration() + 1,
                "no admissible neighbor, stopping"
            );
        }

        let result = TabuResult {
            selection: search.best(),
            metrics: search.best_metrics(),
            initial_selection: search.initial(),
            initial_metrics: search.initial_metrics(),
            iterations: search.iteration(),
            best_iteration: search.best_iteration(),
            termination,
            profit_history,
            constraints: search.constraints().clone(),
        };
        tracing::info!(
            iterations = result.iterations,
            %termination,
            profit = result.metrics.profit,
            cogs = result.metrics.cogs,
            rating = result.metrics.rating,
            "tabu search finished"
        );
        Ok(result)
    }
}

/// Runs Tabu Search with the given shortlist size, item limit, iteration
/// budget and tenure; every other setting keeps its default.
pub fn tabu_search(
    dataset: &Dataset,
    k_per_category: usize,
    max_items: usize,
    max_iterations: usize,
    tabu_tenure: usize,
) -> Result<TabuResult, AssortError> {
    let config = TabuConfig::default()
        .with_k_per_category(k_per_category)
        .with_max_items(max_items)
        .with_max_iterations(max_iterations)
        .with_tabu_tenure(tabu_tenure);
    TabuRunner::run(dataset, &config)
}

/// Runs one independent search per configuration over the same dataset.
///
/// Runs share only read-only data; with the `parallel` feature they are
/// executed on the rayon thread pool. Results keep the order of `configs`.
pub fn sweep(dataset: &Dataset, configs: &[TabuConfig]) -> Vec<Result<TabuResult, AssortError>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        configs
            .par_iter()
            .map(|config| TabuRunner::run(dataset, config))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        configs
            .iter()
            .map(|config| TabuRunner::run(dataset, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::constraints::metrics;

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

    /// Twelve items over four categories with a spread of costs.
    fn shop() -> Dataset {
        let rows = [
            ("A", 4.0, 6.0, 4.6),
            ("A", 2.0, 3.0, 4.7),
            ("A", 6.0, 9.0, 4.2),
            ("B", 3.0, 4.5, 4.5),
            ("B", 5.0, 7.5, 4.3),
            ("B", 1.5, 1.8, 3.9),
            ("C", 2.5, 3.5, 4.6),
            ("C", 4.5, 6.5, 4.4),
            ("C", 1.0, 1.2, 3.8),
            ("D", 3.5, 5.0, 4.5),
            ("D", 2.0, 2.2, 4.0),
            ("D", 5.5, 8.0, 4.4),
        ];
        Dataset::try_from_iter(rows.iter().enumerate().map(|(i, &(cat, cogs, profit, rating))| {
            Item::new(i as u64 + 1, cat, cogs, profit, rating)
        }))
        .unwrap()
    }

    #[test]
    fn test_tabu_result_feasible_and_not_worse_than_initial() {
        let ds = shop();
        let config = TabuConfig::default().with_seed(42);
        let result = TabuRunner::run(&ds, &config).unwrap();

        assert!(result.constraints.is_feasible(&result.selection, &ds));
        assert!(result.profit() >= result.initial_metrics.profit);
        assert_eq!(metrics(&result.selection, &ds), result.metrics);
    }

    #[test]
    fn test_tabu_profit_history_non_decreasing() {
        let ds = shop();
        let result = TabuRunner::run(&ds, &TabuConfig::default().with_seed(1)).unwrap();

        assert_eq!(result.profit_history.len(), result.iterations);
        for window in result.profit_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best profit history should be non-decreasing: {} < {}",
                window[1],
                window[0]
            );
        }
        if let Some(&last) = result.profit_history.last() {
            assert_eq!(last, result.profit());
        }
    }

    #[test]
    fn test_tabu_deterministic_given_seed() {
        let ds = shop();
        // B = 10.5 rejects the top-scored seed (cogs 11), so the randomized
        // constructor runs.
        let config = TabuConfig::default().with_budget_alpha(0.5).with_seed(9);
        let a = TabuRunner::run(&ds, &config).unwrap();
        let b = TabuRunner::run(&ds, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tabu_mini_dataset() {
        // Default thresholds: B = 9.06, Rmin = 4.52. Every three-category
        // selection exceeds the budget, so construction must fail.
        let err = TabuRunner::run(&mini(), &TabuConfig::default()).unwrap_err();
        assert!(matches!(err, AssortError::NoFeasibleInitial { attempts: 1000 }));

        // With a looser budget the search improves on the seed 1+3+5.
        let config = TabuConfig::default().with_budget(13.0).with_min_rating(4.0);
        let result = TabuRunner::run(&mini(), &config).unwrap();
        assert!((result.initial_metrics.profit - 19.0).abs() < 1e-9);
        assert!((result.profit() - 19.7).abs() < 1e-9);
        assert_eq!(
            result.selection,
            vec![ItemId::from(1u64), ItemId::from(3u64), ItemId::from(2u64)]
        );
        assert_eq!(result.best_iteration, 1);
    }

    #[test]
    fn test_tabu_exhaustion_terminates() {
        let config = TabuConfig::default()
            .with_k_per_category(1)
            .with_budget(100.0)
            .with_min_rating(0.0);
        let result = TabuRunner::run(&mini(), &config).unwrap();
        assert_eq!(result.termination, Termination::NeighborhoodExhausted);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.selection, result.initial_selection);
    }

    #[test]
    fn test_tabu_max_iterations_respected() {
        let config = TabuConfig::default()
            .with_max_iterations(3)
            .with_tabu_tenure(1)
            .with_budget(100.0)
            .with_min_rating(0.0);
        let result = TabuRunner::run(&shop(), &config).unwrap();
        assert_eq!(result.iterations, 3);
        assert_eq!(result.termination, Termination::MaxIterations);
    }

    #[test]
    fn test_tabu_stagnation_termination() {
        let config = TabuConfig::default()
            .with_max_iterations(10_000)
            .with_max_no_improve(5)
            .with_tabu_tenure(1)
            .with_budget(100.0)
            .with_min_rating(0.0);
        let result = TabuRunner::run(&shop(), &config).unwrap();
        assert_eq!(result.termination, Termination::Stagnation);
        assert!(result.iterations < 10_000);
    }

    #[test]
    fn test_tabu_cancelled_before_first_iteration() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            TabuRunner::run_with_cancel(&shop(), &TabuConfig::default(), Some(cancel)).unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_tabu_rejects_bad_input() {
        let empty = Dataset::new(Vec::new()).unwrap();
        assert!(matches!(
            TabuRunner::run(&empty, &TabuConfig::default()),
            Err(AssortError::EmptyDataset)
        ));
        assert!(matches!(
            TabuRunner::run(&shop(), &TabuConfig::default().with_max_items(0)),
            Err(AssortError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tabu_with_secure_filter_keeps_full_thresholds() {
        let ds = shop();
        let plain = TabuRunner::run(&ds, &TabuConfig::default()).unwrap();
        let filtered =
            TabuRunner::run(&ds, &TabuConfig::default().with_filter_quantile(0.75)).unwrap();
        assert_eq!(plain.constraints, filtered.constraints);
        assert!(filtered.constraints.is_feasible(&filtered.selection, &ds));
    }

    #[test]
    fn test_run_on_buckets_with_custom_rng() {
        let ds = shop();
        let buckets = top_k_per_category(&ds, 2).unwrap();
        let constraints = Constraints::new(100.0, 0.0).with_max_items(4);
        let mut rng = StdRng::seed_from_u64(3);
        let result = TabuRunner::run_on_buckets(
            &ds,
            &buckets,
            constraints,
            &TabuConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(result.selection.len(), 4);
    }

    #[test]
    fn test_tabu_search_entry_point() {
        let result = tabu_search(&shop(), 3, 6, 100, 7).unwrap();
        assert_eq!(result.selection.len(), 4);
        assert!(result.constraints.is_feasible(&result.selection, &shop()));
    }

    #[test]
    fn test_sweep_matches_individual_runs() {
        let ds = shop();
        let configs: Vec<TabuConfig> = [1, 3, 7]
            .into_iter()
            .map(|t| TabuConfig::default().with_tabu_tenure(t).with_seed(5))
            .collect();
        let swept = sweep(&ds, &configs);
        assert_eq!(swept.len(), 3);
        for (config, result) in configs.iter().zip(swept) {
            assert_eq!(result.unwrap(), TabuRunner::run(&ds, config).unwrap());
        }
    }
}
