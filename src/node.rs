//! Arena-backed node storage for the red-black tree.
//!
//! Nodes live in a `Vec` and refer to each other by `u32` index, so
//! rotations and transplants are plain index reassignments with no
//! ownership cycles. Slot 0 is reserved for the shared sentinel that
//! stands in for every absent child and the root's parent; "is this
//! child absent" is an index comparison against it.
//!
//! Each node stores every value sharing its key. Value slots are
//! tombstoned on removal and never reused within a node's lifetime, so
//! a coordinate into one slot survives removals of its siblings. Freed
//! node slots go on a free list and bump a generation counter, which
//! lets stale coordinates be detected instead of dangling.

use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

/// Index of a node in a tree's arena.
///
/// Opaque outside the crate; obtained from tree accessors such as
/// `RbTree::root` and only meaningful for the tree that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub(crate) u32);

/// The sentinel slot. Always black, never holds a key or values.
pub(crate) const NIL: NodeIdx = NodeIdx(0);

impl NodeIdx {
    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        return self.0 == 0;
    }
}

/// A tree vertex: one key, every value sharing that key, links, color,
/// and the subtree-max augmentation slot.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    /// `None` only for the sentinel and freed slots.
    pub key: Option<K>,
    /// Value slots in insertion order. `None` entries are tombstones.
    pub values: SmallVec<[Option<V>; 1]>,
    /// Number of live (non-tombstone) slots.
    pub live: u32,
    pub red: bool,
    pub parent: NodeIdx,
    pub left: NodeIdx,
    pub right: NodeIdx,
    /// Augmentation: largest end coordinate in the subtree rooted here.
    /// `None` until maintained (see the interval layer).
    pub max: Option<K>,
    /// Bumped every time the slot is freed.
    pub generation: u32,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Node<K, V> {
        return Node {
            key: None,
            values: SmallVec::new(),
            live: 0,
            red: false,
            parent: NIL,
            left: NIL,
            right: NIL,
            max: None,
            generation: 0,
        };
    }

    /// First live value slot, in insertion order.
    pub fn first_slot(&self) -> Option<u32> {
        return self.values.iter().position(|v| v.is_some()).map(|i| i as u32);
    }

    /// Last live value slot, in insertion order.
    pub fn last_slot(&self) -> Option<u32> {
        return self.values.iter().rposition(|v| v.is_some()).map(|i| i as u32);
    }

    /// Next live slot strictly after `slot`.
    pub fn slot_after(&self, slot: u32) -> Option<u32> {
        let from = slot as usize + 1;
        let rest = self.values.get(from..)?;
        return rest.iter().position(|v| v.is_some()).map(|i| (from + i) as u32);
    }

    /// Last live slot strictly before `slot`.
    pub fn slot_before(&self, slot: u32) -> Option<u32> {
        return self.values[..slot as usize]
            .iter()
            .rposition(|v| v.is_some())
            .map(|i| i as u32);
    }

    /// Append a value, returning its slot.
    pub fn push_value(&mut self, value: V) -> u32 {
        let slot = self.values.len() as u32;
        self.values.push(Some(value));
        self.live += 1;
        return slot;
    }
}

/// Contiguous node storage with a free list.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeIdx>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Arena<K, V> {
        return Arena {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
        };
    }

    /// Allocate a fresh red node with no values, reusing a freed slot if
    /// one is available. The reused slot keeps its bumped generation.
    pub fn alloc(&mut self, key: K, parent: NodeIdx) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            let node = &mut self.nodes[idx.0 as usize];
            debug_assert!(node.values.is_empty() && node.live == 0);
            node.key = Some(key);
            node.red = true;
            node.parent = parent;
            node.left = NIL;
            node.right = NIL;
            node.max = None;
            return idx;
        }

        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            key: Some(key),
            values: SmallVec::new(),
            live: 0,
            red: true,
            parent,
            left: NIL,
            right: NIL,
            max: None,
            generation: 0,
        });
        return idx;
    }

    /// Detach a node's slot: drop its key and values, bump the
    /// generation so outstanding coordinates stop validating, and make
    /// the slot available for reuse.
    pub fn free(&mut self, idx: NodeIdx) {
        debug_assert!(!idx.is_nil());
        let node = &mut self.nodes[idx.0 as usize];
        node.key = None;
        node.values.clear();
        node.live = 0;
        node.max = None;
        node.generation += 1;
        self.free.push(idx);
    }

    /// Free every allocated node (for `clear`). Slots are retained so
    /// generations keep counting up.
    pub fn release_all(&mut self) {
        for i in 1..self.nodes.len() {
            if self.nodes[i].key.is_some() {
                self.free(NodeIdx(i as u32));
            }
        }
    }

    /// Look up a live node. Freed slots resolve to `None` even though
    /// their storage remains, so a stale index cannot walk dead links.
    /// The sentinel is always reachable.
    pub fn get(&self, idx: NodeIdx) -> Option<&Node<K, V>> {
        let node = self.nodes.get(idx.0 as usize)?;
        if !idx.is_nil() && node.key.is_none() {
            return None;
        }
        return Some(node);
    }
}

impl<K, V> Index<NodeIdx> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline(always)]
    fn index(&self, idx: NodeIdx) -> &Node<K, V> {
        return &self.nodes[idx.0 as usize];
    }
}

impl<K, V> IndexMut<NodeIdx> for Arena<K, V> {
    #[inline(always)]
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Node<K, V> {
        return &mut self.nodes[idx.0 as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_black_and_empty() {
        let arena: Arena<i32, i32> = Arena::new();
        assert!(!arena[NIL].red);
        assert!(arena[NIL].key.is_none());
        assert_eq!(arena[NIL].live, 0);
    }

    #[test]
    fn slot_navigation_skips_tombstones() {
        let mut arena: Arena<i32, &str> = Arena::new();
        let n = arena.alloc(1, NIL);
        arena[n].push_value("a");
        arena[n].push_value("b");
        arena[n].push_value("c");

        arena[n].values[1] = None;
        arena[n].live -= 1;

        assert_eq!(arena[n].first_slot(), Some(0));
        assert_eq!(arena[n].last_slot(), Some(2));
        assert_eq!(arena[n].slot_after(0), Some(2));
        assert_eq!(arena[n].slot_before(2), Some(0));
        assert_eq!(arena[n].slot_after(2), None);
        assert_eq!(arena[n].slot_before(0), None);
    }

    #[test]
    fn get_rejects_freed_slots_but_not_the_sentinel() {
        let mut arena: Arena<i32, i32> = Arena::new();
        let n = arena.alloc(1, NIL);
        assert!(arena.get(n).is_some());

        arena.free(n);
        assert!(arena.get(n).is_none());
        assert!(arena.get(NIL).is_some());
    }

    #[test]
    fn free_bumps_generation_and_reuses_slot() {
        let mut arena: Arena<i32, i32> = Arena::new();
        let n = arena.alloc(1, NIL);
        assert_eq!(arena[n].generation, 0);

        arena.free(n);
        let m = arena.alloc(2, NIL);
        assert_eq!(m, n);
        assert_eq!(arena[m].generation, 1);
        assert_eq!(arena[m].key, Some(2));
    }
}
