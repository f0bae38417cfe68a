//! The routing objective and the `Result` payload every query returns.

use crate::graph::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    WidenessOnly,
    MinTurnsOnly,
    WidenessAndTurns,
}

const SCORE_TOLERANCE_PCT: f64 = 0.001;
const DISTANCE_TOLERANCE: f64 = 0.01;
const TIME_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub departure_time: f64,
    pub score: f64,
    pub right_turns: u32,
    pub travel_time: f64,
    pub path_distance: f64,
    pub path_nodes: Vec<NodeId>,
    pub wide_edge_indices: Vec<usize>,
    pub path_found: bool,
    pub fallback: bool,
    pub pareto_paths: Option<Vec<RouteResult>>,
}

impl RouteResult {
    /// The canonical "no feasible path" payload: always an `Ok` value with
    /// `path_found: false`, never a bare `None`.
    pub fn no_path() -> Self {
        RouteResult {
            departure_time: 0.0,
            score: 0.0,
            right_turns: 0,
            travel_time: 0.0,
            path_distance: 0.0,
            path_nodes: Vec::new(),
            wide_edge_indices: Vec::new(),
            path_found: false,
            fallback: false,
            pareto_paths: None,
        }
    }

    /// `a` dominates `b` under `(score max, right_turns min)`, strict in at
    /// least one, within the duplicate-elimination tolerances below.
    pub fn dominates(&self, other: &RouteResult) -> bool {
        let score_ge = self.score >= other.score - SCORE_TOLERANCE_PCT;
        let turns_le = self.right_turns <= other.right_turns;
        let strictly_better = self.score > other.score + SCORE_TOLERANCE_PCT || self.right_turns < other.right_turns;
        score_ge && turns_le && strictly_better
    }

    /// Two results are near-duplicates and only one should survive Pareto
    /// deduplication.
    pub fn nearly_equal(&self, other: &RouteResult) -> bool {
        (self.score - other.score).abs() <= SCORE_TOLERANCE_PCT
            && self.right_turns == other.right_turns
            && (self.path_distance - other.path_distance).abs() <= DISTANCE_TOLERANCE
            && (self.travel_time - other.travel_time).abs() <= TIME_TOLERANCE
    }
}
