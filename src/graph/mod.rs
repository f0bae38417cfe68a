//! Node/edge store, the per-edge piecewise-linear travel-time table, and the
//! bearing-based right-turn classifier.

pub mod loader;

use std::sync::Arc;

/// Node ids are 32bit unsigned ints, matching the scale of real-world OSM
/// extracts without needing a 64bit index everywhere.
pub type NodeId = u32;

pub const PERIOD: f64 = 1440.0;

#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub lat: f64,
    pub lon: f64,
}

/// The data carried by a directed edge, shared (via `Arc`) between the
/// forward and backward adjacency lists so loading doesn't duplicate every
/// time table.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub distance: f64,
    pub base_width: f64,
    pub rush_width: f64,
    /// `(departure_minute_key, travel_time)`, sorted by key, keys in `[0, PERIOD)`.
    pub time_table: Arc<[(f64, f64)]>,
}

impl EdgeData {
    pub fn is_clearway(&self) -> bool {
        (self.base_width - self.rush_width).abs() < 1e-9
    }

    /// Minimum travel time across all samples; the edge weight used by the
    /// lower-bound A* pass and the fallback fastest-path. An edge with no
    /// time-table samples is a pass-through with zero cost.
    pub fn lowest_cost(&self) -> f64 {
        self.time_table.iter().map(|&(_, tt)| tt).fold(f64::INFINITY, f64::min).min(if self.time_table.is_empty() { 0.0 } else { f64::INFINITY })
    }

    pub fn width(&self, tau: f64, rush_windows: &[(f64, f64); 2]) -> f64 {
        let t = tau.rem_euclid(PERIOD);
        if rush_windows.iter().any(|&(a, b)| t >= a && t < b) {
            self.rush_width
        } else {
            self.base_width
        }
    }

    /// `arrival_time(τ) → τ'`, linearly interpolating between the two
    /// time-table samples neighboring `τ`, wrapping at the day boundary.
    /// An empty time table passes `τ` through unchanged.
    pub fn arrival_time(&self, tau: f64) -> f64 {
        if self.time_table.is_empty() {
            return tau;
        }
        let day = (tau / PERIOD).floor() * PERIOD;
        day + self.arrival_time_local(tau - day)
    }

    fn arrival_time_local(&self, t: f64) -> f64 {
        let n = self.time_table.len();
        let mut idx = 0;
        for (i, &(x, _)) in self.time_table.iter().enumerate() {
            if x <= t {
                idx = i;
            } else {
                break;
            }
        }
        let (x1, tt1) = self.time_table[idx];
        let y1 = x1 + tt1;
        let (x2, y2) = if idx + 1 < n {
            let (x2, tt2) = self.time_table[idx + 1];
            (x2, x2 + tt2)
        } else {
            (PERIOD, PERIOD + self.time_table[0].1)
        };
        if (x2 - x1).abs() < 1e-9 {
            y1
        } else {
            y1 + (y2 - y1) * (t - x1) / (x2 - x1)
        }
    }

    /// Inverse of `arrival_time`: the departure that lands at `arrival` on
    /// the segment that produced it. Not used by the core search, but kept
    /// as documented edge behaviour for callers building their own analyses
    /// on top of the graph.
    pub fn departure_time(&self, arrival: f64) -> f64 {
        if self.time_table.is_empty() {
            return arrival;
        }
        let n = self.time_table.len();
        let day = (arrival / PERIOD).floor() * PERIOD;
        let local = arrival - day;
        let mut idx = 0;
        for i in 0..n {
            let (x1, tt1) = self.time_table[i];
            let y1 = x1 + tt1;
            let (x2, y2) = if i + 1 < n {
                let (x2, tt2) = self.time_table[i + 1];
                (x2, x2 + tt2)
            } else {
                (PERIOD, PERIOD + self.time_table[0].1)
            };
            if local >= y1 - 1e-9 && local <= y2 + 1e-9 {
                idx = i;
                if (y2 - y1).abs() < 1e-9 {
                    return day + x1;
                }
                return day + x1 + (x2 - x1) * (local - y1) / (y2 - y1);
            }
        }
        let (x1, tt1) = self.time_table[idx];
        day + x1 + tt1
    }
}

/// Degrees in `[0, 360)`, bearing from `a` to `b` over a flat-earth
/// approximation (road network extents are small enough that great-circle
/// bearing isn't worth the trig cost or the extra failure modes near the
/// antimeridian).
pub fn bearing(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dy = b.0 - a.0;
    let dx = b.1 - a.1;
    // atan2(dy,dx) measures counter-clockwise from east; road bearings are
    // conventionally measured clockwise from north.
    let from_east = dy.atan2(dx).to_degrees();
    (90.0 - from_east).rem_euclid(360.0)
}

/// `θ_min = 30°`, `θ_max = 150°` — the single shared right-turn threshold
/// used identically by labeling and the fallback fastest-path.
pub fn is_counted_right_turn(u: (f64, f64), v: (f64, f64), w: (f64, f64), window: (f64, f64)) -> bool {
    let b1 = bearing(u, v);
    let b2 = bearing(v, w);
    let delta = (b2 - b1 + 360.0).rem_euclid(360.0);
    delta >= window.0 && delta <= window.1
}

/// Node/edge store. Immutable after load; the A* pass attaches its h-values
/// and feasibility flag per query without mutating the graph itself.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    forward: Vec<Vec<(NodeId, EdgeData)>>,
    backward: Vec<Vec<(NodeId, EdgeData)>>,
    rush_windows: [(f64, f64); 2],
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<(NodeId, NodeId, EdgeData)>, rush_windows: [(f64, f64); 2]) -> Self {
        let n = nodes.len();
        let mut forward = vec![Vec::new(); n];
        let mut backward = vec![Vec::new(); n];
        for (from, to, data) in edges {
            forward[from as usize].push((to, data.clone()));
            backward[to as usize].push((from, data));
        }
        Graph { nodes, forward, backward, rush_windows }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (node as usize) < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id as usize]
    }

    pub fn position(&self, id: NodeId) -> (f64, f64) {
        let n = self.nodes[id as usize];
        (n.lat, n.lon)
    }

    /// Outgoing edges of `node`, or the reversed (incoming) edges when
    /// `backward` is set, so the backward search walks the graph against
    /// its real edge direction.
    pub fn neighbors(&self, node: NodeId, backward: bool) -> &[(NodeId, EdgeData)] {
        if backward {
            &self.backward[node as usize]
        } else {
            &self.forward[node as usize]
        }
    }

    pub fn rush_windows(&self) -> &[(f64, f64); 2] {
        &self.rush_windows
    }

    pub fn edge_width(&self, edge: &EdgeData, tau: f64) -> f64 {
        edge.width(tau, &self.rush_windows)
    }

    /// Finds the `EdgeData` for the directed edge `from -> to`, if present.
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&EdgeData> {
        self.forward[from as usize].iter().find(|(n, _)| *n == to).map(|(_, e)| e)
    }
}
