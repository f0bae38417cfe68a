//! Meeting-node join and Pareto reduction.

use crate::graph::Graph;
use crate::label::LabelArena;
use crate::loop_removal::remove_loops;
use crate::result::{Objective, RouteResult};
use crate::store::SharedState;
use rayon::prelude::*;
use tracing::debug;

/// Joins every (forward, backward) label pair at every intersection node and
/// reduces the resulting candidates under `objective`.
pub fn join(graph: &Graph, shared: &SharedState, forward: &LabelArena, backward: &LabelArena, wideness_threshold: f64, objective: Objective) -> RouteResult {
    let nodes = shared.intersection_nodes();
    let candidates: Vec<RouteResult> = nodes
        .par_iter()
        .flat_map_iter(|&m| {
            let f_indices = shared.indices(m, false);
            let b_indices = shared.indices(m, true);
            let pair_count = f_indices.len() * b_indices.len();
            debug!(node = m, forward_labels = f_indices.len(), backward_labels = b_indices.len(), pair_count, "joining intersection node");
            f_indices
                .into_iter()
                .flat_map(move |f_idx| b_indices.clone().into_iter().map(move |b_idx| join_pair(graph, forward, backward, f_idx, b_idx, wideness_threshold)))
                .collect::<Vec<_>>()
                .into_iter()
        })
        .collect();

    debug!(intersection_nodes = nodes.len(), candidates = candidates.len(), "join finished");
    reduce_candidates(candidates, objective)
}

/// Joins a single forward/backward label pair into a scored, loop-free
/// candidate `RouteResult`.
fn join_pair(graph: &Graph, forward: &LabelArena, backward: &LabelArena, f_idx: u32, b_idx: u32, wideness_threshold: f64) -> RouteResult {
    let f_label = forward.get(f_idx);
    let b_label = backward.get(b_idx);

    let mut best_departure = f_label.arrival.points().first().map(|bp| bp.x).unwrap_or(0.0);
    let mut best_profile_score = f64::NEG_INFINITY;
    let total_label_distance = f_label.distance + b_label.distance;
    for (arr_bp, wide_bp) in f_label.arrival.points().iter().zip(f_label.wide.points()) {
        let arrival_at_m = arr_bp.y;
        let w_f = wide_bp.y;
        let w_b = b_label.wide.evaluate(arrival_at_m);
        let score = if total_label_distance > 0.0 { 100.0 * (w_f + w_b) / total_label_distance } else { 0.0 };
        if score > best_profile_score {
            best_profile_score = score;
            best_departure = arr_bp.x;
        }
    }

    let mut path_nodes = forward.path_root_to_node(f_idx);
    let tail = backward.path_node_to_root(b_idx);
    path_nodes.extend_from_slice(&tail[1.min(tail.len())..]);
    let path_nodes = remove_loops(&path_nodes);

    let mut travel_time = 0.0;
    let mut total_distance = 0.0;
    let mut wide_distance = 0.0;
    let mut wide_edge_indices = Vec::new();
    for (i, pair) in path_nodes.windows(2).enumerate() {
        if let Some(edge) = graph.edge(pair[0], pair[1]) {
            travel_time += edge.lowest_cost();
            total_distance += edge.distance;
            if edge.rush_width >= wideness_threshold {
                wide_distance += edge.distance;
                wide_edge_indices.push(i);
            }
        }
    }
    let score = if total_distance > 0.0 { 100.0 * wide_distance / total_distance } else { 0.0 };

    RouteResult {
        departure_time: best_departure,
        score,
        right_turns: f_label.right_turns + b_label.right_turns,
        travel_time,
        path_distance: total_distance,
        path_nodes,
        wide_edge_indices,
        path_found: true,
        fallback: false,
        pareto_paths: None,
    }
}

/// Reduces the join's candidate set under the selected objective.
pub fn reduce_candidates(candidates: Vec<RouteResult>, objective: Objective) -> RouteResult {
    if candidates.is_empty() {
        return RouteResult::no_path();
    }

    match objective {
        Objective::WidenessOnly => candidates.into_iter().max_by(|a, b| a.score.total_cmp(&b.score)).unwrap(),
        Objective::MinTurnsOnly => candidates.into_iter().min_by_key(|c| c.right_turns).unwrap(),
        Objective::WidenessAndTurns => {
            let mut pareto = pareto_set(candidates);
            pareto.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| a.right_turns.cmp(&b.right_turns))
                    .then_with(|| a.path_distance.total_cmp(&b.path_distance))
                    .then_with(|| a.travel_time.total_cmp(&b.travel_time))
            });
            let mut primary = pareto[0].clone();
            primary.pareto_paths = Some(pareto);
            primary
        }
    }
}

/// Non-dominated subset of `candidates`, deduplicated within
/// `RouteResult::nearly_equal`'s tolerances.
fn pareto_set(candidates: Vec<RouteResult>) -> Vec<RouteResult> {
    let mut kept: Vec<RouteResult> = Vec::new();
    'candidate: for c in candidates {
        let mut i = 0;
        while i < kept.len() {
            if kept[i].nearly_equal(&c) {
                continue 'candidate;
            }
            if kept[i].dominates(&c) {
                continue 'candidate;
            }
            if c.dominates(&kept[i]) {
                kept.remove(i);
                continue;
            }
            i += 1;
        }
        kept.push(c);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: f64, turns: u32) -> RouteResult {
        RouteResult {
            departure_time: 0.0,
            score,
            right_turns: turns,
            travel_time: 10.0,
            path_distance: 100.0,
            path_nodes: vec![0, 1],
            wide_edge_indices: vec![],
            path_found: true,
            fallback: false,
            pareto_paths: None,
        }
    }

    #[test]
    fn reduce_under_wideness_only_picks_the_best_score() {
        let candidates = vec![sample(50.0, 3), sample(90.0, 1), sample(70.0, 0)];
        let result = reduce_candidates(candidates, Objective::WidenessOnly);
        assert!((result.score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn reduce_under_min_turns_only_picks_the_fewest_turns() {
        let candidates = vec![sample(50.0, 3), sample(90.0, 1), sample(70.0, 0)];
        let result = reduce_candidates(candidates, Objective::MinTurnsOnly);
        assert_eq!(result.right_turns, 0);
    }

    #[test]
    fn pareto_set_drops_dominated_candidates() {
        let candidates = vec![sample(90.0, 2), sample(50.0, 5), sample(80.0, 1)];
        let kept = pareto_set(candidates);
        // (50.0, 5) is dominated by both others
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|c| (c.score - 50.0).abs() > 1e-9));
    }

    #[test]
    fn widenessandturns_attaches_the_full_pareto_list() {
        let candidates = vec![sample(90.0, 2), sample(80.0, 1)];
        let result = reduce_candidates(candidates, Objective::WidenessAndTurns);
        assert!((result.score - 90.0).abs() < 1e-9);
        assert_eq!(result.pareto_paths.unwrap().len(), 2);
    }

    #[test]
    fn no_candidates_yields_no_path() {
        let result = reduce_candidates(Vec::new(), Objective::WidenessOnly);
        assert!(!result.path_found);
    }
}
