//! Best-first labeling search, run once per direction. The driver runs one
//! instance for the forward direction (root at the source) and one for the
//! backward direction (root at the destination) concurrently via
//! `rayon::join`, both writing into the same `SharedState`.

use crate::astar::LowerBounds;
use crate::graph::{is_counted_right_turn, Graph, NodeId};
use crate::label::LabelArena;
use crate::plf::{compose_edge, Profile};
use crate::store::SharedState;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    idx: u32,
    wide_score: f64,
    distance: f64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.wide_score == other.wide_score && self.distance == other.distance
    }
}
impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    /// Primary: higher current wide-road score first. Secondary: among
    /// equally promising labels, the one with less travel time so far
    /// expands first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.wide_score.total_cmp(&other.wide_score).then_with(|| other.distance.total_cmp(&self.distance))
    }
}

/// Runs one direction's labeling search to termination: empty frontier, or
/// `cancel` observed set. Returns the arena of every label ever created in
/// this direction; surviving labels are also recorded in `shared`.
#[allow(clippy::too_many_arguments)]
pub fn run_direction(
    graph: &Graph,
    shared: &SharedState,
    lower_bounds: &LowerBounds,
    root_node: NodeId,
    root_arrival: Profile,
    root_wide: Profile,
    budget: f64,
    backward: bool,
    wideness_threshold: f64,
    rush_windows: &[(f64, f64); 2],
    right_turn_window: (f64, f64),
    cancel: &AtomicBool,
) -> LabelArena {
    let tau0 = root_arrival.points().first().map(|bp| bp.x).unwrap_or(0.0);
    let half_budget = budget / 2.0;

    let mut arena = LabelArena::new();
    let root_idx = arena.push_root(root_node, root_arrival, root_wide);
    let root_wide_pct = arena.get(root_idx).max_wide_percentage();
    shared.try_insert(root_node, backward, root_idx, 0, root_wide_pct);

    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry { idx: root_idx, wide_score: root_wide_pct, distance: 0.0 });

    let mut accepted = 0u32;
    let mut rejected = 0u32;
    let mut cancelled = false;

    while let Some(FrontierEntry { idx, .. }) = frontier.pop() {
        if cancel.load(AtomicOrdering::Relaxed) {
            cancelled = true;
            break;
        }
        let node = arena.get(idx).node;
        for &(m, ref edge) in graph.neighbors(node, backward) {
            let label = arena.get(idx);
            let (new_arrival, new_wide) = compose_edge(&label.arrival, &label.wide, edge, rush_windows, wideness_threshold);

            let min_arrival = new_arrival.points().iter().map(|bp| bp.y).fold(f64::INFINITY, f64::min);
            if min_arrival - tau0 > half_budget {
                rejected += 1;
                continue;
            }
            if !lower_bounds.feasible(m, budget) {
                rejected += 1;
                continue;
            }

            let prev = arena.predecessor_node(idx);
            let turned_right = prev.is_some_and(|p| {
                // `graph.neighbors(node, backward)` walks the adjacency lists
                // against the real edge direction when `backward` is set, so
                // the real travel order around this expansion is `m, node,
                // prev` here, not `prev, node, m`.
                if backward {
                    is_counted_right_turn(graph.position(m), graph.position(node), graph.position(p), right_turn_window)
                } else {
                    is_counted_right_turn(graph.position(p), graph.position(node), graph.position(m), right_turn_window)
                }
            });
            let right_turns = label.right_turns + u32::from(turned_right);
            let distance = label.distance + edge.distance;

            let child_idx = arena.push_child(idx, m, new_arrival, new_wide, right_turns, distance);
            let wide_pct = arena.get(child_idx).max_wide_percentage();
            if shared.try_insert(m, backward, child_idx, right_turns, wide_pct) {
                accepted += 1;
                frontier.push(FrontierEntry { idx: child_idx, wide_score: wide_pct, distance });
            } else {
                rejected += 1;
            }
        }
    }

    if cancelled {
        warn!(backward, accepted, rejected, "labeling direction cancelled, returning partial arena");
    } else {
        debug!(backward, accepted, rejected, labels = arena.len(), "labeling direction finished");
    }

    arena
}
