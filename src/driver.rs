//! Driver: wires lower-bound A* into the two labeling directions and the
//! join, deadline-bounded, falling back to a plain fastest-path when
//! labeling misses its per-task deadline.

use crate::astar::LowerBounds;
use crate::config::Config;
use crate::error::{RouteError, RouteOutcome};
use crate::graph::{is_counted_right_turn, Graph, NodeId};
use crate::join;
use crate::label::LabelArena;
use crate::labeling;
use crate::plf::{seed_arrival, seed_wide};
use crate::result::{Objective, RouteResult};
use crate::store::SharedState;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};

pub struct Driver {
    graph: Graph,
    config: Config,
}

impl Driver {
    pub fn new(graph: Graph, config: Config) -> RouteOutcome<Driver> {
        config.validate()?;
        Ok(Driver { graph, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Runs the full pipeline for one query. Bounded by `config.query_timeout`
    /// overall and `config.labeling_timeout` per labeling task.
    pub fn query(&self, source: NodeId, destination: NodeId, tau0: f64, tau1: f64, budget: f64, objective: Objective) -> RouteOutcome<RouteResult> {
        let span = info_span!("query", source, destination, mode = ?objective);
        let _guard = span.enter();

        if !self.graph.contains(source) {
            return Err(RouteError::NotFound(source));
        }
        if !self.graph.contains(destination) {
            return Err(RouteError::NotFound(destination));
        }

        let query_deadline = Instant::now() + self.config.query_timeout;
        match run_labeling(&self.graph, &self.config, source, destination, tau0, tau1, budget) {
            LabelingOutcome::Infeasible => {
                info!(source, destination, budget, "query infeasible under lower-bound A*");
                Ok(RouteResult::no_path())
            }
            LabelingOutcome::TimedOut => {
                warn!(source, destination, "labeling search timed out, falling back to plain fastest path");
                if Instant::now() >= query_deadline {
                    return Ok(RouteResult::no_path());
                }
                Ok(fallback_shortest_path(&self.graph, source, destination, budget, tau0, self.config.right_turn_window))
            }
            LabelingOutcome::Found { shared, forward, backward } => {
                if shared.intersection_nodes().is_empty() {
                    info!(source, destination, "labeling found no meeting node, falling back to plain fastest path");
                    return Ok(fallback_shortest_path(&self.graph, source, destination, budget, tau0, self.config.right_turn_window));
                }
                Ok(join::join(&self.graph, &shared, &forward, &backward, self.config.wideness_threshold, objective))
            }
        }
    }
}

/// The outcome of the A* + labeling stages, before fallback/join decide what
/// to do with it. `QueryCache` consumes `Found` directly so it can cache the
/// `SharedState` for a later re-join under a different objective.
pub(crate) enum LabelingOutcome {
    Infeasible,
    TimedOut,
    Found { shared: SharedState, forward: LabelArena, backward: LabelArena },
}

pub(crate) fn run_labeling(graph: &Graph, config: &Config, source: NodeId, destination: NodeId, tau0: f64, tau1: f64, budget: f64) -> LabelingOutcome {
    let lower_bounds = LowerBounds::compute(graph, source, destination);
    if !lower_bounds.source_feasible(source, budget) {
        return LabelingOutcome::Infeasible;
    }

    let shared = SharedState::new(graph.num_nodes(), config.max_labels_per_node);
    let cancel = AtomicBool::new(false);
    let labeling_deadline = Instant::now() + config.labeling_timeout;

    let (forward_arena, backward_arena) = std::thread::scope(|scope| {
        scope.spawn(|| {
            while Instant::now() < labeling_deadline {
                if cancel.load(AtomicOrdering::Relaxed) {
                    return;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            cancel.store(true, AtomicOrdering::Relaxed);
        });

        let forward_arrival = seed_arrival(tau0, tau1, config.interval_duration_minutes, &config.rush_hour_windows);
        let forward_wide = seed_wide(&forward_arrival);
        let backward_arrival = seed_arrival(tau0, tau1, config.interval_duration_minutes, &config.rush_hour_windows);
        let backward_wide = seed_wide(&backward_arrival);

        let result = rayon::join(
            || {
                labeling::run_direction(
                    graph,
                    &shared,
                    &lower_bounds,
                    source,
                    forward_arrival,
                    forward_wide,
                    budget,
                    false,
                    config.wideness_threshold,
                    &config.rush_hour_windows,
                    config.right_turn_window,
                    &cancel,
                )
            },
            || {
                labeling::run_direction(
                    graph,
                    &shared,
                    &lower_bounds,
                    destination,
                    backward_arrival,
                    backward_wide,
                    budget,
                    true,
                    config.wideness_threshold,
                    &config.rush_hour_windows,
                    config.right_turn_window,
                    &cancel,
                )
            },
        );
        // wake the watcher so the scope doesn't wait out the full timeout
        // when labeling finishes early
        cancel.store(true, AtomicOrdering::Relaxed);
        result
    });

    if Instant::now() >= labeling_deadline {
        return LabelingOutcome::TimedOut;
    }
    LabelingOutcome::Found { shared, forward: forward_arena, backward: backward_arena }
}

#[derive(Debug, Clone, Copy)]
struct HeapItem {
    cost: f64,
    node: NodeId,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

/// Plain shortest path by `lowest_cost`, used when labeling misses its
/// deadline. Always returns `fallback: true`, `score: 0.0`.
fn fallback_shortest_path(graph: &Graph, source: NodeId, destination: NodeId, budget: f64, tau0: f64, right_turn_window: (f64, f64)) -> RouteResult {
    let n = graph.num_nodes();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![None; n];
    dist[source as usize] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapItem { cost: 0.0, node: source });

    while let Some(HeapItem { cost, node }) = heap.pop() {
        if cost > dist[node as usize] {
            continue;
        }
        if node == destination {
            break;
        }
        for &(to, ref edge) in graph.neighbors(node, false) {
            let next = cost + edge.lowest_cost();
            if next < dist[to as usize] {
                dist[to as usize] = next;
                prev[to as usize] = Some(node);
                heap.push(HeapItem { cost: next, node: to });
            }
        }
    }

    let travel_time = dist[destination as usize];
    if !travel_time.is_finite() || travel_time > budget {
        let mut result = RouteResult::no_path();
        result.fallback = true;
        return result;
    }

    let mut path_nodes = Vec::new();
    let mut cur = Some(destination);
    while let Some(node) = cur {
        path_nodes.push(node);
        cur = prev[node as usize];
    }
    path_nodes.reverse();

    let mut path_distance = 0.0;
    for pair in path_nodes.windows(2) {
        if let Some(edge) = graph.edge(pair[0], pair[1]) {
            path_distance += edge.distance;
        }
    }

    let mut right_turns = 0;
    for triple in path_nodes.windows(3) {
        let (u, v, w) = (graph.position(triple[0]), graph.position(triple[1]), graph.position(triple[2]));
        if is_counted_right_turn(u, v, w, right_turn_window) {
            right_turns += 1;
        }
    }

    RouteResult {
        departure_time: tau0,
        score: 0.0,
        right_turns,
        travel_time,
        path_distance,
        path_nodes,
        wide_edge_indices: Vec::new(),
        path_found: true,
        fallback: true,
        pareto_paths: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RUSH_WINDOWS;
    use crate::graph::{EdgeData, Graph, Node};
    use std::sync::Arc;

    fn line_graph() -> Graph {
        let nodes = vec![
            Node { lat: 0.0, lon: 0.0 },
            Node { lat: 1.0, lon: 0.0 },
            Node { lat: 2.0, lon: 0.0 },
            Node { lat: 3.0, lon: 0.0 },
            Node { lat: 4.0, lon: 0.0 },
        ];
        let edge = |d: f64| EdgeData { distance: d, base_width: 10.0, rush_width: 10.0, time_table: Arc::from(vec![(0.0, d)].into_boxed_slice()) };
        Graph::new(
            nodes,
            vec![(0, 1, edge(5.0)), (1, 2, edge(5.0)), (2, 3, edge(5.0)), (3, 4, edge(5.0))],
            DEFAULT_RUSH_WINDOWS,
        )
    }

    #[test]
    fn query_returns_a_full_path_on_a_line_graph() {
        let driver = Driver::new(line_graph(), Config::default()).unwrap();
        let result = driver.query(0, 4, 0.0, 60.0, 100.0, Objective::WidenessOnly).unwrap();
        assert!(result.path_found);
        assert_eq!(result.path_nodes.first(), Some(&0));
        assert_eq!(result.path_nodes.last(), Some(&4));
    }

    #[test]
    fn unreachable_destination_yields_no_path() {
        let mut nodes = vec![Node { lat: 0.0, lon: 0.0 }, Node { lat: 1.0, lon: 0.0 }];
        nodes.push(Node { lat: 2.0, lon: 0.0 });
        let graph = Graph::new(nodes, vec![], DEFAULT_RUSH_WINDOWS);
        let driver = Driver::new(graph, Config::default()).unwrap();
        let result = driver.query(0, 2, 0.0, 60.0, 100.0, Objective::WidenessOnly).unwrap();
        assert!(!result.path_found);
    }

    #[test]
    fn an_unknown_node_id_is_a_caller_error() {
        let driver = Driver::new(line_graph(), Config::default()).unwrap();
        let err = driver.query(0, 99, 0.0, 60.0, 100.0, Objective::WidenessOnly).unwrap_err();
        assert_eq!(err, RouteError::NotFound(99));
    }

    #[test]
    fn too_tight_a_budget_is_infeasible() {
        let driver = Driver::new(line_graph(), Config::default()).unwrap();
        let result = driver.query(0, 4, 0.0, 60.0, 1.0, Objective::WidenessOnly).unwrap();
        assert!(!result.path_found);
    }
}
