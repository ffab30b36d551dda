//! Handle-based open queue.
//!
//! A binary min-heap of `(Key, NodeId)` entries with a node-id → heap-slot
//! map. Vertices have exactly one canonical record elsewhere (the planner's
//! slab or record map); the queue holds only ids and key snapshots. Any
//! key-changing mutation must go through [`OpenQueue::update`], so the heap
//! property can never be silently broken by in-place edits and nothing
//! needs a defensive re-heapify.

use std::collections::HashMap;

use crate::grid::NodeId;

use super::key::Key;

/// Indexed priority queue over vertex ids, ordered by [`Key`].
#[derive(Clone, Debug, Default)]
pub(crate) struct OpenQueue {
    heap: Vec<(Key, NodeId)>,
    slot: HashMap<NodeId, usize>,
}

impl OpenQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.slot.contains_key(&id)
    }

    /// Minimum entry without removing it.
    #[inline]
    pub(crate) fn peek(&self) -> Option<(Key, NodeId)> {
        self.heap.first().copied()
    }

    /// Insert a vertex that is not currently queued.
    pub(crate) fn push(&mut self, id: NodeId, key: Key) {
        debug_assert!(!self.contains(id), "vertex {id} is already queued");
        let i = self.heap.len();
        self.heap.push((key, id));
        self.slot.insert(id, i);
        self.sift_up(i);
    }

    /// Remove and return the minimum entry.
    pub(crate) fn pop(&mut self) -> Option<(Key, NodeId)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let (key, id) = self.heap.pop().expect("heap is non-empty");
        self.slot.remove(&id);
        if !self.heap.is_empty() {
            self.slot.insert(self.heap[0].1, 0);
            self.sift_down(0);
        }
        Some((key, id))
    }

    /// Re-key a queued vertex and restore heap order.
    pub(crate) fn update(&mut self, id: NodeId, key: Key) {
        let i = *self
            .slot
            .get(&id)
            .expect("update() requires the vertex to be queued");
        self.heap[i].0 = key;
        self.sift_up(i);
        let i = self.slot[&id];
        self.sift_down(i);
    }

    /// Insert or re-key, whichever applies.
    pub(crate) fn upsert(&mut self, id: NodeId, key: Key) {
        if self.contains(id) {
            self.update(id, key);
        } else {
            self.push(id, key);
        }
    }

    /// Remove an arbitrary queued vertex. Returns false if it was absent.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        let Some(i) = self.slot.remove(&id) else {
            return false;
        };
        let last = self.heap.len() - 1;
        if i != last {
            self.heap.swap(i, last);
            self.heap.pop();
            let moved = self.heap[i].1;
            self.slot.insert(moved, i);
            self.sift_up(i);
            let j = self.slot[&moved];
            self.sift_down(j);
        } else {
            self.heap.pop();
        }
        true
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].0.is_less(&self.heap[parent].0) {
                break;
            }
            self.swap_slots(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;

            if left < len && self.heap[left].0.is_less(&self.heap[smallest].0) {
                smallest = left;
            }
            if right < len && self.heap[right].0.is_less(&self.heap[smallest].0) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap_slots(i, smallest);
            i = smallest;
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slot.insert(self.heap[a].1, a);
        self.slot.insert(self.heap[b].1, b);
    }

    /// Min-heap property over the stored key snapshots.
    #[cfg(test)]
    pub(crate) fn heap_property_holds(&self) -> bool {
        (1..self.heap.len()).all(|i| {
            let parent = (i - 1) / 2;
            !self.heap[i].0.is_less(&self.heap[parent].0)
        })
    }

    /// Every heap entry is indexed, and every index points at its entry.
    #[cfg(test)]
    pub(crate) fn slot_map_consistent(&self) -> bool {
        self.slot.len() == self.heap.len()
            && self
                .slot
                .iter()
                .all(|(&id, &i)| i < self.heap.len() && self.heap[i].1 == id)
    }
}
