//! Per-run search state.
//!
//! A [`TabuSearch`] owns everything one run mutates: the current selection,
//! the incumbent and the tabu list. The dataset and candidate pool are only
//! borrowed, so several searches may share them.
//!
//! A selection is held as one dataset position per candidate category
//! (slot); the flat id list is derived only when it leaves this module.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use super::config::TabuConfig;
use super::types::{StepOutcome, SwapMove, TabuList, Termination};
use crate::catalog::{Dataset, ItemId};
use crate::constraints::{Constraints, Metrics};
use crate::error::AssortError;
use crate::greedy::CandidateBuckets;

/// A candidate category and its shortlist as dataset positions.
#[derive(Debug, Clone)]
struct Slot {
    category: String,
    candidates: Vec<usize>,
}

/// Best admissible neighbor seen during one iteration.
struct Neighbor {
    slot: usize,
    item: usize,
    assignment: Vec<usize>,
    metrics: Metrics,
}

/// Step-wise tabu search over single-category swaps.
#[derive(Debug, Clone)]
pub struct TabuSearch<'a> {
    dataset: &'a Dataset,
    constraints: Constraints,
    slots: Vec<Slot>,
    tenure: usize,
    aspiration: bool,
    tabu: TabuList,
    current: Vec<usize>,
    current_metrics: Metrics,
    best: Vec<usize>,
    best_metrics: Metrics,
    initial: Vec<usize>,
    initial_metrics: Metrics,
    iteration: usize,
    best_iteration: usize,
}

impl<'a> TabuSearch<'a> {
    /// Prepares a search and builds its initial selection.
    ///
    /// Candidate ids are resolved against `dataset`, which is also the
    /// dataset every selection is evaluated on. Empty shortlists are
    /// skipped.
    ///
    /// # Errors
    /// - [`AssortError::UnknownItem`] if a candidate id is not in `dataset`.
    /// - [`AssortError::NoFeasibleInitial`] if neither the seed nor any of
    ///   `config.max_init_tries` random draws is feasible.
    pub fn new<R: Rng>(
        dataset: &'a Dataset,
        buckets: &CandidateBuckets,
        constraints: Constraints,
        config: &TabuConfig,
        rng: &mut R,
    ) -> Result<Self, AssortError> {
        let mut slots = Vec::with_capacity(buckets.len());
        for (category, ids) in buckets.iter() {
            if ids.is_empty() {
                continue;
            }
            let candidates = ids
                .iter()
                .map(|id| {
                    dataset
                        .position(id)
                        .ok_or_else(|| AssortError::UnknownItem(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            slots.push(Slot {
                category: category.to_string(),
                candidates,
            });
        }

        let (initial, initial_metrics) =
            construct(&slots, dataset, &constraints, config.max_init_tries, rng)?;

        Ok(Self {
            dataset,
            constraints,
            tabu: TabuList::new(slots.len()),
            slots,
            tenure: config.tabu_tenure,
            aspiration: config.aspiration,
            current: initial.clone(),
            current_metrics: initial_metrics,
            best: initial.clone(),
            best_metrics: initial_metrics,
            initial,
            initial_metrics,
            iteration: 0,
            best_iteration: 0,
        })
    }

    /// Runs one iteration: scans the swap neighborhood, moves to the most
    /// profitable admissible neighbor and updates memory and incumbent.
    pub fn step(&mut self) -> StepOutcome {
        let Some(chosen) = self.best_admissible_neighbor() else {
            return StepOutcome::Exhausted;
        };

        self.iteration += 1;
        let removed = self.current[chosen.slot];
        self.current = chosen.assignment;
        self.current_metrics = chosen.metrics;

        // Forbid undoing this swap, then age all locks (including the new one).
        self.tabu.insert(chosen.slot, removed, self.tenure);
        self.tabu.tick();

        let improved = chosen.metrics.profit > self.best_metrics.profit;
        if improved {
            self.best = self.current.clone();
            self.best_metrics = chosen.metrics;
            self.best_iteration = self.iteration;
        }

        let items = self.dataset.items();
        StepOutcome::Moved(SwapMove {
            category: self.slots[chosen.slot].category.clone(),
            removed: items[removed].id.clone(),
            added: items[chosen.item].id.clone(),
            profit: chosen.metrics.profit,
            improved,
        })
    }

    /// Steps until `max_iterations` moves have been made in total or the
    /// neighborhood is exhausted.
    pub fn run(&mut self, max_iterations: usize) -> Termination {
        self.run_with(max_iterations, None, |_, _| ControlFlow::Continue(()))
    }

    /// Like [`run`](Self::run), but checks `cancel` before every step and
    /// hands each move to `on_move`, which may stop the run early with its
    /// own [`Termination`].
    pub fn run_with<F>(
        &mut self,
        max_iterations: usize,
        cancel: Option<&AtomicBool>,
        mut on_move: F,
    ) -> Termination
    where
        F: FnMut(&Self, &SwapMove) -> ControlFlow<Termination>,
    {
        while self.iteration < max_iterations {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Termination::Cancelled;
            }
            let mv = match self.step() {
                StepOutcome::Moved(mv) => mv,
                StepOutcome::Exhausted => return Termination::NeighborhoodExhausted,
            };
            if let ControlFlow::Break(termination) = on_move(self, &mv) {
                return termination;
            }
        }
        Termination::MaxIterations
    }

    fn best_admissible_neighbor(&self) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;

        for (slot_idx, slot) in self.slots.iter().enumerate() {
            let current_item = self.current[slot_idx];
            for &candidate in &slot.candidates {
                if candidate == current_item {
                    continue;
                }
                let mut assignment = self.current.clone();
                assignment[slot_idx] = candidate;

                let Ok(metrics) = evaluate(&assignment, self.dataset, &self.constraints) else {
                    continue;
                };

                if self.tabu.is_tabu(slot_idx, candidate)
                    && !(self.aspiration && metrics.profit > self.best_metrics.profit)
                {
                    continue;
                }

                // Strict comparison: the first neighbor seen wins ties.
                if best
                    .as_ref()
                    .map_or(true, |b| metrics.profit > b.metrics.profit)
                {
                    best = Some(Neighbor {
                        slot: slot_idx,
                        item: candidate,
                        assignment,
                        metrics,
                    });
                }
            }
        }
        best
    }

    fn ids(&self, assignment: &[usize]) -> Vec<ItemId> {
        let items = self.dataset.items();
        assignment.iter().map(|&pos| items[pos].id.clone()).collect()
    }

    /// Current working selection.
    pub fn current(&self) -> Vec<ItemId> {
        self.ids(&self.current)
    }

    pub fn current_metrics(&self) -> Metrics {
        self.current_metrics
    }

    /// Best selection found so far.
    pub fn best(&self) -> Vec<ItemId> {
        self.ids(&self.best)
    }

    pub fn best_metrics(&self) -> Metrics {
        self.best_metrics
    }

    /// The selection the search started from.
    pub fn initial(&self) -> Vec<ItemId> {
        self.ids(&self.initial)
    }

    pub fn initial_metrics(&self) -> Metrics {
        self.initial_metrics
    }

    /// Iterations (moves) performed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Iteration at which the incumbent was found (0 for the initial one).
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    pub fn tabu(&self) -> &TabuList {
        &self.tabu
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Categories explored, in slot order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.category.as_str())
    }
}

/// Checks a slot assignment and returns its metrics if feasible.
fn evaluate(
    assignment: &[usize],
    dataset: &Dataset,
    constraints: &Constraints,
) -> Result<Metrics, crate::constraints::Violation> {
    let mut positions = assignment.to_vec();
    positions.sort_unstable();
    positions.dedup();
    constraints.check_positions(&positions, dataset)
}

/// Builds the initial selection: the top candidate of every slot, or
/// failing that, uniformly random draws per slot.
fn construct<R: Rng>(
    slots: &[Slot],
    dataset: &Dataset,
    constraints: &Constraints,
    max_tries: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Metrics), AssortError> {
    if slots.is_empty() {
        return Err(AssortError::NoFeasibleInitial { attempts: 0 });
    }

    let seed: Vec<usize> = slots.iter().map(|s| s.candidates[0]).collect();
    let violation = match evaluate(&seed, dataset, constraints) {
        Ok(metrics) => return Ok((seed, metrics)),
        Err(v) => v,
    };
    tracing::warn!(%violation, "top-scored seed infeasible, trying random construction");

    for attempt in 1..=max_tries {
        let draw: Vec<usize> = slots
            .iter()
            .map(|s| s.candidates[rng.random_range(0..s.candidates.len())])
            .collect();
        if let Ok(metrics) = evaluate(&draw, dataset, constraints) {
            tracing::debug!(attempt, "random construction succeeded");
            return Ok((draw, metrics));
        }
    }
    Err(AssortError::NoFeasibleInitial {
        attempts: max_tries,
    })
}
