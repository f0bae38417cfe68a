//! Opt-in recompute cache. Disabled unless explicitly constructed; keyed by
//! `(source, destination, budget, departure interval)`, storing the
//! `SharedState` of a completed (non-fallback) labeling run so a different
//! objective can be re-joined without re-running A* or labeling.

use crate::config::Config;
use crate::driver::{run_labeling, LabelingOutcome};
use crate::graph::{Graph, NodeId};
use crate::join;
use crate::label::LabelArena;
use crate::result::{Objective, RouteResult};
use crate::store::SharedState;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct QueryKey {
    source: NodeId,
    destination: NodeId,
    budget_bits: u64,
    tau0_bits: u64,
    tau1_bits: u64,
}

impl QueryKey {
    fn new(source: NodeId, destination: NodeId, budget: f64, tau0: f64, tau1: f64) -> Self {
        QueryKey { source, destination, budget_bits: budget.to_bits(), tau0_bits: tau0.to_bits(), tau1_bits: tau1.to_bits() }
    }
}

struct CachedSearch {
    shared: SharedState,
    forward: LabelArena,
    backward: LabelArena,
}

/// Process-local, in-memory cache of completed labeling runs. Not shared
/// across `Driver` instances and not persisted.
#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CachedSearch>,
}

impl QueryCache {
    pub fn new() -> Self {
        QueryCache { entries: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs A* + labeling for this query (or reuses a cached run with the
    /// same key), then joins under `objective`. Mirrors `Driver::query`'s
    /// pipeline but without the plain-fastest-path fallback: a timed-out or
    /// infeasible run is reported but never cached.
    pub fn query(&mut self, graph: &Graph, config: &Config, source: NodeId, destination: NodeId, tau0: f64, tau1: f64, budget: f64, objective: Objective) -> RouteResult {
        let key = QueryKey::new(source, destination, budget, tau0, tau1);

        if !self.entries.contains_key(&key) {
            match run_labeling(graph, config, source, destination, tau0, tau1, budget) {
                LabelingOutcome::Infeasible | LabelingOutcome::TimedOut => return RouteResult::no_path(),
                LabelingOutcome::Found { shared, forward, backward } => {
                    self.entries.insert(key, CachedSearch { shared, forward, backward });
                }
            }
        }

        self.recompute(graph, config, source, destination, tau0, tau1, budget, objective).expect("just inserted or already present")
    }

    /// Re-joins a previously completed run under a different `objective`
    /// without touching A* or labeling. Returns `None` if this key was
    /// never cached (or was only ever a fallback/infeasible run).
    #[allow(clippy::too_many_arguments)]
    pub fn recompute(
        &self,
        graph: &Graph,
        config: &Config,
        source: NodeId,
        destination: NodeId,
        tau0: f64,
        tau1: f64,
        budget: f64,
        objective: Objective,
    ) -> Option<RouteResult> {
        let key = QueryKey::new(source, destination, budget, tau0, tau1);
        let cached = self.entries.get(&key)?;
        if cached.shared.intersection_nodes().is_empty() {
            return Some(RouteResult::no_path());
        }
        Some(join::join(graph, &cached.shared, &cached.forward, &cached.backward, config.wideness_threshold, objective))
    }
}
