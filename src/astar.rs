//! Lower-bound A* preprocessing: two plain shortest-path runs using each
//! edge's `lowest_cost`, producing per-node h-values and the feasibility
//! gate the labeling search and the driver both consult.

use crate::graph::{Graph, NodeId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct LowerBounds {
    forward: Vec<f64>,
    backward: Vec<f64>,
}

impl LowerBounds {
    pub fn compute(graph: &Graph, source: NodeId, destination: NodeId) -> Self {
        LowerBounds {
            forward: dijkstra_lowest_cost(graph, source, false),
            backward: dijkstra_lowest_cost(graph, destination, true),
        }
    }

    pub fn forward(&self, node: NodeId) -> f64 {
        self.forward[node as usize]
    }

    pub fn backward(&self, node: NodeId) -> f64 {
        self.backward[node as usize]
    }

    /// `h_forward(n) + h_backward(n) ≤ budget` — the admissibility-derived
    /// feasibility predicate.
    pub fn feasible(&self, node: NodeId, budget: f64) -> bool {
        self.forward(node) + self.backward(node) <= budget
    }

    pub fn source_feasible(&self, source: NodeId, budget: f64) -> bool {
        self.feasible(source, budget) && self.forward(source).is_finite()
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    // reversed so `BinaryHeap` (a max-heap) behaves as a min-heap on cost
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

fn dijkstra_lowest_cost(graph: &Graph, src: NodeId, backward: bool) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; graph.num_nodes()];
    dist[src as usize] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, node: src });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if cost > dist[node as usize] {
            continue;
        }
        for &(to, ref edge) in graph.neighbors(node, backward) {
            let next = cost + edge.lowest_cost();
            if next < dist[to as usize] {
                dist[to as usize] = next;
                heap.push(HeapEntry { cost: next, node: to });
            }
        }
    }
    dist
}
