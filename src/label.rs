//! Labels and the per-direction label arena.
//!
//! A naive label would keep a full predecessor map covering every node on
//! its partial path — `O(path length)` memory per label. Here each `Label`
//! instead carries a `parent_label_index` into a per-direction arena (a
//! "trail" pattern); path reconstruction walks the chain only once, at join
//! time.

use crate::graph::NodeId;
use crate::plf::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub node: NodeId,
    pub arrival: Profile,
    pub wide: Profile,
    pub right_turns: u32,
    pub distance: f64,
    parent: Option<u32>,
}

impl Label {
    pub fn root(node: NodeId, arrival: Profile, wide: Profile) -> Self {
        Label { node, arrival, wide, right_turns: 0, distance: 0.0, parent: None }
    }

    /// The label's own "wide-road percentage" used by the bounded store's
    /// `(right_turns asc, wide_road_percentage desc)` comparator: the
    /// maximum fraction of distance-so-far that could still be wide,
    /// approximated here by the wide profile's own best sample.
    pub fn max_wide_percentage(&self) -> f64 {
        if self.distance <= 0.0 {
            return 100.0;
        }
        let best_wide = self.wide.points().iter().map(|bp| bp.y).fold(0.0_f64, f64::max);
        100.0 * best_wide / self.distance
    }
}

/// A per-direction arena of labels. Labels are never removed from the
/// arena even if evicted from the bounded store, since a surviving label
/// descended from them may still need to walk the chain at join time.
#[derive(Debug, Default)]
pub struct LabelArena {
    entries: Vec<Label>,
}

impl LabelArena {
    pub fn new() -> Self {
        LabelArena { entries: Vec::new() }
    }

    pub fn push_root(&mut self, node: NodeId, arrival: Profile, wide: Profile) -> u32 {
        self.push(Label::root(node, arrival, wide))
    }

    pub fn push_child(&mut self, parent_idx: u32, node: NodeId, arrival: Profile, wide: Profile, right_turns: u32, distance: f64) -> u32 {
        self.push(Label { node, arrival, wide, right_turns, distance, parent: Some(parent_idx) })
    }

    fn push(&mut self, label: Label) -> u32 {
        self.entries.push(label);
        (self.entries.len() - 1) as u32
    }

    pub fn get(&self, idx: u32) -> &Label {
        &self.entries[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The node immediately preceding `idx`'s node on its path, if any.
    /// Used to recover `prev` for the right-turn classifier.
    pub fn predecessor_node(&self, idx: u32) -> Option<NodeId> {
        self.get(idx).parent.map(|p| self.get(p).node)
    }

    /// `[root, ..., idx's node]`, in travel order.
    pub fn path_root_to_node(&self, idx: u32) -> Vec<NodeId> {
        let mut nodes = self.path_node_to_root(idx);
        nodes.reverse();
        nodes
    }

    /// `[idx's node, ..., root]`, the natural order you get by following
    /// `parent` pointers from `idx`.
    pub fn path_node_to_root(&self, idx: u32) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut cur = Some(idx);
        while let Some(i) = cur {
            let label = self.get(i);
            nodes.push(label.node);
            cur = label.parent;
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plf::{seed_arrival, seed_wide};
    use crate::config::DEFAULT_RUSH_WINDOWS;

    #[test]
    fn arena_reconstructs_path_in_both_orders() {
        let mut arena = LabelArena::new();
        let arrival = seed_arrival(0.0, 60.0, 30.0, &DEFAULT_RUSH_WINDOWS);
        let wide = seed_wide(&arrival);
        let root = arena.push_root(1, arrival.clone(), wide.clone());
        let a = arena.push_child(root, 2, arrival.clone(), wide.clone(), 0, 10.0);
        let b = arena.push_child(a, 3, arrival.clone(), wide.clone(), 0, 20.0);

        assert_eq!(arena.path_root_to_node(b), vec![1, 2, 3]);
        assert_eq!(arena.path_node_to_root(b), vec![3, 2, 1]);
        assert_eq!(arena.predecessor_node(b), Some(2));
        assert_eq!(arena.predecessor_node(root), None);
    }
}
