//! Interval layer over [`RbTree`]: per-node subtree-max augmentation
//! and stabbing queries.
//!
//! Shape:
//! - Values carry an interval through the [`Interval`] trait; the tree
//!   key is the interval's start coordinate.
//! - Each node's `max` slot holds the largest end coordinate anywhere
//!   in its subtree. The [`IntervalMax`] hooks keep it current through
//!   inserts, removes, rotations, and deletion splices.
//! - [`search`](RbTree::search) prunes on `max`: a subtree is skipped
//!   entirely when nothing in it can reach past the query point. Cost
//!   is O(log n + k) for k hits.
//! - Containment is strictly open on both sides: a point sitting
//!   exactly on a start or end coordinate does not match.
//! - Bulk load defers maintenance: [`insert_deferred`](RbTree::insert_deferred)
//!   skips the per-operation max work and one [`init_max`](RbTree::init_max)
//!   pass computes every slot bottom-up.

use smallvec::SmallVec;

use crate::coord::Coordinate;
use crate::node::{NIL, NodeIdx};
use crate::tree::{Augment, RbTree};

/// A half-open-agnostic span: anything with a start and an end on the
/// key axis. `end` is the coordinate the subtree max aggregates.
pub trait Interval<K> {
    fn start(&self) -> K;

    fn end(&self) -> K;
}

impl<K: Clone> Interval<K> for std::ops::Range<K> {
    fn start(&self) -> K {
        return self.start.clone();
    }

    fn end(&self) -> K {
        return self.end.clone();
    }
}

/// Augmentation keeping each node's subtree-max-end slot exact.
///
/// `deferred` suspends all maintenance during bulk load; the tree stays
/// usable as a plain multi-map until [`init_max`](RbTree::init_max)
/// runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalMax {
    deferred: bool,
}

/// Red-black interval tree: starts as keys, subtree max-end per node.
pub type IntervalTree<K, V> = RbTree<K, V, IntervalMax>;

impl<K: Ord + Clone, V: Interval<K>> Augment<K, V> for IntervalMax {
    fn on_value_added(tree: &mut RbTree<K, V, Self>, coord: Coordinate) {
        if tree.aug.deferred {
            return;
        }
        let node = coord.node();
        let end = match tree.value(coord) {
            Some(v) => v.end(),
            None => return,
        };
        // A new end only matters if it beats the node's current max;
        // ancestors then see the change through the upward walk.
        let raised = match &tree.arena[node].max {
            Some(max) => end > *max,
            None => true,
        };
        if raised {
            tree.arena[node].max = Some(end);
            tree.update_max_up(node);
        }
    }

    fn on_value_removed(tree: &mut RbTree<K, V, Self>, node: NodeIdx) {
        if tree.update_max(node) {
            tree.update_max_up(node);
        }
    }

    fn on_rotated(tree: &mut RbTree<K, V, Self>, bottom: NodeIdx, top: NodeIdx) {
        if tree.aug.deferred {
            return;
        }
        // The demoted node gained/lost a subtree; recompute it first so
        // the promoted node folds a correct child value.
        tree.update_max(bottom);
        tree.update_max(top);
        tree.update_max_up(top);
    }

    fn on_transplanted(tree: &mut RbTree<K, V, Self>, node: NodeIdx) {
        // `node` may be the sentinel; its parent link still names the
        // splice point, and the upward walk repairs the spine from
        // there.
        tree.update_max(node);
        tree.update_max_up(node);
    }
}

impl<K: Ord + Clone, V: Interval<K>> RbTree<K, V, IntervalMax> {
    /// Insert an interval value, keyed by its start coordinate.
    pub fn add(&mut self, value: V) -> Coordinate {
        return self.insert(value.start(), value);
    }

    /// Insert without maintaining any max slot. Searches are
    /// meaningless until [`init_max`](Self::init_max) runs; plain keyed
    /// operations keep working.
    pub fn insert_deferred(&mut self, value: V) -> Coordinate {
        self.aug.deferred = true;
        let coord = self.insert(value.start(), value);
        self.aug.deferred = false;
        return coord;
    }

    /// Recompute every max slot bottom-up in one O(n) pass and re-arm
    /// incremental maintenance. Closes a bulk load made of
    /// [`insert_deferred`](Self::insert_deferred) calls.
    pub fn init_max(&mut self) {
        self.aug.deferred = false;
        let root = self.root;
        if !root.is_nil() {
            self.init_max_below(root);
        }
    }

    // Recursion depth is bounded by the tree height, O(log n).
    fn init_max_below(&mut self, node: NodeIdx) {
        let left = self.arena[node].left;
        let right = self.arena[node].right;
        if !left.is_nil() {
            self.init_max_below(left);
        }
        if !right.is_nil() {
            self.init_max_below(right);
        }
        self.update_max(node);
    }

    /// Recompute one node's max from its live values and its children's
    /// max slots. Returns whether the stored value changed. No-op on
    /// the sentinel or a stale index.
    pub fn update_max(&mut self, node: NodeIdx) -> bool {
        if node.is_nil() || self.arena.get(node).is_none() {
            return false;
        }

        let mut best: Option<K> = None;
        for value in self.node_values(node) {
            let end = value.end();
            if best.as_ref().is_none_or(|b| end > *b) {
                best = Some(end);
            }
        }
        for child in [self.arena[node].left, self.arena[node].right] {
            if child.is_nil() {
                continue;
            }
            if let Some(m) = &self.arena[child].max {
                if best.as_ref().is_none_or(|b| *m > *b) {
                    best = Some(m.clone());
                }
            }
        }

        if self.arena[node].max == best {
            return false;
        }
        self.arena[node].max = best;
        return true;
    }

    /// Propagate a max change from `node`'s parent toward the root,
    /// stopping as soon as an ancestor's recomputed max is unchanged.
    /// Each node's max depends only on its own values and its
    /// children's slots, so an unchanged ancestor ends the walk.
    pub fn update_max_up(&mut self, node: NodeIdx) {
        let mut current = self.arena[node].parent;
        while !current.is_nil() {
            if !self.update_max(current) {
                break;
            }
            current = self.arena[current].parent;
        }
    }

    /// All intervals strictly containing `point` (start < point < end),
    /// ascending by start. Subtrees whose max cannot exceed the point
    /// are never visited.
    pub fn search(&self, point: K) -> Search<'_, K, V> {
        let mut stack: SmallVec<[Frame; 16]> = SmallVec::new();
        if self.subtree_may_overlap(self.root, &point) {
            stack.push(Frame::Explore(self.root));
        }
        return Search {
            tree: self,
            point,
            stack,
            node: NIL,
            slot: 0,
        };
    }

    /// Bulk construction: deferred inserts plus one
    /// [`init_max`](Self::init_max) pass.
    pub fn from_values<I: IntoIterator<Item = V>>(values: I) -> Self {
        let mut tree = Self::new();
        for value in values {
            tree.insert_deferred(value);
        }
        tree.init_max();
        return tree;
    }

    fn subtree_may_overlap(&self, node: NodeIdx, point: &K) -> bool {
        if node.is_nil() {
            return false;
        }
        // Strict containment: a subtree whose max equals the point
        // holds nothing that extends past it.
        return self.arena[node].max.as_ref().is_some_and(|m| *m > *point);
    }
}

impl<K: Ord + Clone, V: Interval<K>> FromIterator<V> for RbTree<K, V, IntervalMax> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        return Self::from_values(iter);
    }
}

#[derive(Clone, Copy)]
enum Frame {
    /// Prune-check and expand a subtree.
    Explore(NodeIdx),
    /// Emit one node's qualifying values.
    Visit(NodeIdx),
}

/// Pruned in-order stabbing walk; see [`RbTree::search`].
pub struct Search<'a, K, V> {
    tree: &'a RbTree<K, V, IntervalMax>,
    point: K,
    stack: SmallVec<[Frame; 16]>,
    node: NodeIdx,
    slot: usize,
}

impl<'a, K: Ord + Clone, V: Interval<K>> Iterator for Search<'a, K, V> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        loop {
            // Drain the node currently being visited.
            while !self.node.is_nil() {
                let node = &self.tree.arena[self.node];
                if self.slot >= node.values.len() {
                    self.node = NIL;
                    break;
                }
                let slot = self.slot;
                self.slot += 1;
                if let Some(value) = &node.values[slot] {
                    if value.end() > self.point {
                        return Some(self.tree.make_coord(self.node, slot as u32));
                    }
                }
            }

            match self.stack.pop()? {
                Frame::Explore(n) => {
                    let left = self.tree.arena[n].left;
                    let right = self.tree.arena[n].right;

                    // A hit must start before the point, so a node
                    // keyed at or past it contributes nothing, and
                    // neither can its right subtree.
                    let starts_before =
                        self.tree.node_key(n).is_some_and(|k| *k < self.point);

                    // Pushed in reverse pop order: left, node, right.
                    if starts_before && self.tree.subtree_may_overlap(right, &self.point) {
                        self.stack.push(Frame::Explore(right));
                    }
                    if starts_before {
                        self.stack.push(Frame::Visit(n));
                    }
                    if self.tree.subtree_may_overlap(left, &self.point) {
                        self.stack.push(Frame::Explore(left));
                    }
                }
                Frame::Visit(n) => {
                    self.node = n;
                    self.slot = 0;
                }
            }
        }
    }
}
