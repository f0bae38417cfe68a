//! The bounded per-node label store and the concurrent `SharedState` both
//! labeling directions insert into.

use crate::graph::NodeId;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Mutex;

const PCT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rank {
    right_turns: u32,
    wide_pct: f64,
}

impl Rank {
    /// `self` is strictly better than `other` under `(right_turns asc,
    /// wide_road_percentage desc)`.
    fn strictly_better_than(&self, other: &Rank) -> bool {
        match self.right_turns.cmp(&other.right_turns) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.wide_pct > other.wide_pct + PCT_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    idx: u32,
    rank: Rank,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.rank.right_turns == other.rank.right_turns && (self.rank.wide_pct - other.rank.wide_pct).abs() < PCT_EPSILON
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// Ordered so the heap's max (its `peek`) is the *worst* entry: more
    /// right turns is worse, and among equal turns a lower wide-road
    /// percentage is worse.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .right_turns
            .cmp(&other.rank.right_turns)
            .then_with(|| other.rank.wide_pct.total_cmp(&self.rank.wide_pct))
    }
}

/// A size-capped store of label-arena indices for one node in one
/// direction, ordered worst-first so the heap's peek is always the
/// eviction candidate.
#[derive(Debug)]
pub struct BoundedStore {
    cap: usize,
    entries: BinaryHeap<Entry>,
}

impl BoundedStore {
    pub fn new(cap: usize) -> Self {
        BoundedStore { cap, entries: BinaryHeap::with_capacity(cap) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tries to insert `idx` ranked by `(right_turns, wide_pct)`. Returns
    /// whether it was accepted.
    pub fn try_insert(&mut self, idx: u32, right_turns: u32, wide_pct: f64) -> bool {
        let candidate = Entry { idx, rank: Rank { right_turns, wide_pct } };
        if self.entries.len() < self.cap {
            self.entries.push(candidate);
            return true;
        }
        let worst = *self.entries.peek().expect("cap > 0 implies non-empty once full");
        if candidate.rank.strictly_better_than(&worst.rank) {
            self.entries.pop();
            self.entries.push(candidate);
            true
        } else {
            false
        }
    }

    pub fn indices(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.idx).collect()
    }
}

/// Concurrent per-node label stores for both directions, plus the
/// intersection-node set. One `Mutex<BoundedStore>` per node per direction
/// is a deliberately simple sharding scheme — cheap to reason about, and
/// contention is naturally low since each node is only ever touched by its
/// own direction's task.
pub struct SharedState {
    forward: Vec<Mutex<BoundedStore>>,
    backward: Vec<Mutex<BoundedStore>>,
    intersection: Mutex<HashSet<NodeId>>,
}

impl SharedState {
    pub fn new(num_nodes: usize, cap: usize) -> Self {
        SharedState {
            forward: (0..num_nodes).map(|_| Mutex::new(BoundedStore::new(cap))).collect(),
            backward: (0..num_nodes).map(|_| Mutex::new(BoundedStore::new(cap))).collect(),
            intersection: Mutex::new(HashSet::new()),
        }
    }

    fn store(&self, node: NodeId, backward: bool) -> &Mutex<BoundedStore> {
        if backward {
            &self.backward[node as usize]
        } else {
            &self.forward[node as usize]
        }
    }

    /// Attempts the insert for `node` in the given direction; on success,
    /// promotes `node` to the intersection set once both directions hold
    /// at least one label there.
    pub fn try_insert(&self, node: NodeId, backward: bool, idx: u32, right_turns: u32, wide_pct: f64) -> bool {
        let accepted = self.store(node, backward).lock().unwrap().try_insert(idx, right_turns, wide_pct);
        if accepted {
            let other_nonempty = !self.store(node, !backward).lock().unwrap().is_empty();
            if other_nonempty {
                self.intersection.lock().unwrap().insert(node);
            }
        }
        accepted
    }

    pub fn indices(&self, node: NodeId, backward: bool) -> Vec<u32> {
        self.store(node, backward).lock().unwrap().indices()
    }

    pub fn intersection_nodes(&self) -> Vec<NodeId> {
        self.intersection.lock().unwrap().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_store_respects_capacity() {
        let mut store = BoundedStore::new(2);
        assert!(store.try_insert(0, 3, 10.0));
        assert!(store.try_insert(1, 2, 10.0));
        // worse than both current entries: rejected
        assert!(!store.try_insert(2, 5, 1.0));
        assert_eq!(store.len(), 2);
        // strictly better than the current worst (3 turns): accepted, evicts it
        assert!(store.try_insert(3, 1, 10.0));
        assert_eq!(store.len(), 2);
        assert!(store.indices().contains(&3));
        assert!(!store.indices().contains(&0));
    }

    #[test]
    fn shared_state_marks_intersection_once_both_sides_present() {
        let shared = SharedState::new(3, 4);
        assert!(shared.try_insert(1, false, 0, 0, 100.0));
        assert!(shared.intersection_nodes().is_empty());
        assert!(shared.try_insert(1, true, 0, 0, 50.0));
        assert_eq!(shared.intersection_nodes(), vec![1]);
    }
}
