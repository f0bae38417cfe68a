//! Loop removal: truncates a node sequence back to the first time each node
//! was seen, dropping any closed cycle the forward/backward concatenation
//! introduced.

use crate::graph::NodeId;
use std::collections::HashMap;

pub fn remove_loops(path: &[NodeId]) -> Vec<NodeId> {
    let mut cleaned: Vec<NodeId> = Vec::with_capacity(path.len());
    let mut first_index: HashMap<NodeId, usize> = HashMap::new();

    for &node in path {
        if let Some(&at) = first_index.get(&node) {
            for dropped in cleaned.drain(at + 1..) {
                first_index.remove(&dropped);
            }
        } else {
            first_index.insert(node, cleaned.len());
            cleaned.push(node);
        }
    }
    cleaned
}
