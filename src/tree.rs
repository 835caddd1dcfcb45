//! Balanced keyed multi-map: a red-black tree where equal keys share a
//! node.
//!
//! Structure:
//! - One node per distinct key; values with an existing key are appended
//!   to that node's list with no rebalancing.
//! - Classic red-black insert/delete fixups keep paths within 2x of each
//!   other, so every keyed operation is O(log n).
//! - All traversal hands out [`Coordinate`]s, stable handles that stop
//!   validating when their value or node goes away.
//!
//! Structural-change hooks ([`Augment`]) let a layered structure keep a
//! per-node aggregate current. The hooks fire at quiescent points (links
//! fully rewired), never fail, and default to no-ops; the interval layer
//! in [`crate::interval`] is the one augmentation built on them.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::coord::Coordinate;
use crate::node::{Arena, NIL, NodeIdx};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

fn next_tree_id() -> u64 {
    return NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed);
}

/// Structural-change hooks fired by [`RbTree`].
///
/// An augmentation is composed with the tree as a type parameter rather
/// than derived from it; hook state (if any) lives in the tree's `aug`
/// field. All methods default to no-ops.
///
/// Firing points:
/// - `on_value_added`: after the value is linked in, before insertion
///   fixup (so a fresh node's aggregate exists before any rotation).
/// - `on_value_removed`: after a value is unlinked from a node that
///   still holds other values.
/// - `on_rotated`: after each rotation relink, with the demoted and
///   promoted nodes.
/// - `on_transplanted`: after the deletion splice completes, once per
///   transplant, deepest splice first, with the node that moved into a
///   new position. That node may be the sentinel; its parent link is
///   valid at that moment and names the splice point.
pub trait Augment<K, V>: Default + Clone + Sized {
    fn on_value_added(_tree: &mut RbTree<K, V, Self>, _coord: Coordinate) {}

    fn on_value_removed(_tree: &mut RbTree<K, V, Self>, _node: NodeIdx) {}

    fn on_rotated(_tree: &mut RbTree<K, V, Self>, _bottom: NodeIdx, _top: NodeIdx) {}

    fn on_transplanted(_tree: &mut RbTree<K, V, Self>, _node: NodeIdx) {}
}

/// The hook-free augmentation: a plain keyed multi-map.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAugment;

impl<K, V> Augment<K, V> for NoAugment {}

/// Red-black multi-map from `K` to lists of `V`.
///
/// Values are owned by the tree; external code refers to them through
/// [`Coordinate`]s. Failure of an expected kind (missing key, stale
/// coordinate, empty tree) is signalled by `Option`/`bool` returns,
/// never by panics.
pub struct RbTree<K, V, A = NoAugment> {
    pub(crate) arena: Arena<K, V>,
    pub(crate) root: NodeIdx,
    pub(crate) len: usize,
    pub(crate) id: u64,
    pub(crate) aug: A,
}

impl<K: Ord, V, A: Augment<K, V>> RbTree<K, V, A> {
    pub fn new() -> RbTree<K, V, A> {
        return RbTree {
            arena: Arena::new(),
            root: NIL,
            len: 0,
            id: next_tree_id(),
            aug: A::default(),
        };
    }

    /// Number of stored values (not distinct keys).
    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Remove everything. All outstanding coordinates become stale.
    pub fn clear(&mut self) {
        self.arena.release_all();
        self.root = NIL;
        self.len = 0;
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Insert a value under `key`, returning a coordinate to it.
    ///
    /// If the key already has a node, the value is appended to that
    /// node's list with no rebalancing. Otherwise a new red node is
    /// linked at the BST position and insertion fixup restores the
    /// red-black invariants.
    pub fn insert(&mut self, key: K, value: V) -> Coordinate {
        let mut current = self.root;
        let mut last = NIL;

        while !current.is_nil() {
            last = current;
            match key.cmp(self.key_unchecked(current)) {
                Ordering::Less => current = self.arena[current].left,
                Ordering::Greater => current = self.arena[current].right,
                Ordering::Equal => {
                    let slot = self.arena[current].push_value(value);
                    self.len += 1;
                    let coord = self.make_coord(current, slot);
                    A::on_value_added(self, coord);
                    return coord;
                }
            }
        }

        let node = self.arena.alloc(key, last);
        let slot = self.arena[node].push_value(value);

        if last.is_nil() {
            self.root = node;
        } else {
            let goes_left = self.key_unchecked(node) < self.key_unchecked(last);
            if goes_left {
                self.arena[last].left = node;
            } else {
                self.arena[last].right = node;
            }
        }

        let coord = self.make_coord(node, slot);
        A::on_value_added(self, coord);
        self.insert_fixup(node);
        self.len += 1;
        return coord;
    }

    fn insert_fixup(&mut self, mut node: NodeIdx) {
        loop {
            let parent = self.arena[node].parent;
            if !self.arena[parent].red {
                break;
            }
            // Parent is red, so it is not the root and the grandparent
            // is a real node.
            let grand = self.arena[parent].parent;

            if parent == self.arena[grand].left {
                let uncle = self.arena[grand].right;
                if self.arena[uncle].red {
                    self.arena[parent].red = false;
                    self.arena[uncle].red = false;
                    self.arena[grand].red = true;
                    node = grand;
                } else {
                    if node == self.arena[parent].right {
                        // Triangle: rotate into a line first.
                        node = parent;
                        self.left_rotate(node);
                    }
                    let parent = self.arena[node].parent;
                    let grand = self.arena[parent].parent;
                    self.arena[parent].red = false;
                    self.arena[grand].red = true;
                    self.right_rotate(grand);
                }
            } else {
                let uncle = self.arena[grand].left;
                if self.arena[uncle].red {
                    self.arena[parent].red = false;
                    self.arena[uncle].red = false;
                    self.arena[grand].red = true;
                    node = grand;
                } else {
                    if node == self.arena[parent].left {
                        node = parent;
                        self.right_rotate(node);
                    }
                    let parent = self.arena[node].parent;
                    let grand = self.arena[parent].parent;
                    self.arena[parent].red = false;
                    self.arena[grand].red = true;
                    self.left_rotate(grand);
                }
            }
        }

        let root = self.root;
        self.arena[root].red = false;
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove the value a coordinate points at.
    ///
    /// Returns `false` (and does nothing) if the coordinate is stale,
    /// already removed, or belongs to a different tree. If the value
    /// was the node's last one, the node itself is deleted and the
    /// red-black invariants restored.
    pub fn remove(&mut self, coord: Coordinate) -> bool {
        let Some((node, slot)) = self.resolve(coord) else {
            return false;
        };

        self.arena[node].values[slot as usize] = None;
        self.arena[node].live -= 1;
        self.len -= 1;

        if self.arena[node].live > 0 {
            A::on_value_removed(self, node);
            return true;
        }

        self.delete_node(node);
        return true;
    }

    /// Remove a whole node and every value it holds in one call.
    ///
    /// Returns `false` (and does nothing) for the sentinel or an index
    /// whose node is no longer in the tree. All coordinates into the
    /// node become stale.
    pub fn remove_node(&mut self, node: NodeIdx) -> bool {
        if node.is_nil() || self.arena.get(node).is_none() {
            return false;
        }
        self.len -= self.arena[node].live as usize;
        self.delete_node(node);
        return true;
    }

    /// Full red-black deletion of a now-empty node.
    fn delete_node(&mut self, node: NodeIdx) {
        let mut next = node;
        let mut next_red = self.arena[next].red;
        let child;
        // Moved-in nodes per transplant, deepest splice first, so an
        // augmentation can recompute aggregates bottom-up.
        let mut moved: [NodeIdx; 2] = [NIL, NIL];
        let mut moved_len = 0;

        let left = self.arena[node].left;
        let right = self.arena[node].right;

        if left.is_nil() {
            child = right;
            self.transplant(node, right);
            moved[0] = right;
            moved_len = 1;
        } else if right.is_nil() {
            child = left;
            self.transplant(node, left);
            moved[0] = left;
            moved_len = 1;
        } else {
            // Promote the in-order successor (minimum of the right
            // subtree) into this node's place, keeping its own fixup
            // obligations.
            next = self.minimum_node(right);
            next_red = self.arena[next].red;
            child = self.arena[next].right;

            if next != right {
                self.transplant(next, child);
                self.arena[next].right = right;
                self.arena[right].parent = next;
                moved[moved_len] = child;
                moved_len += 1;
            } else {
                // The sentinel's parent link matters for the fixup walk.
                self.arena[child].parent = next;
            }

            self.transplant(node, next);
            self.arena[next].left = left;
            self.arena[left].parent = next;
            let red = self.arena[node].red;
            self.arena[next].red = red;
            moved[moved_len] = next;
            moved_len += 1;
        }

        for &n in &moved[..moved_len] {
            A::on_transplanted(self, n);
        }

        if !next_red {
            self.remove_fixup(child);
        }

        self.arena.free(node);
    }

    /// Replace the subtree rooted at `old` with the one rooted at
    /// `new`. Sets `new`'s parent link even when `new` is the sentinel.
    fn transplant(&mut self, old: NodeIdx, new: NodeIdx) {
        let parent = self.arena[old].parent;

        if parent.is_nil() {
            self.root = new;
        } else if old == self.arena[parent].left {
            self.arena[parent].left = new;
        } else {
            self.arena[parent].right = new;
        }

        self.arena[new].parent = parent;
    }

    /// Push the double-black deficiency left by removing a black node
    /// upward until it is absorbed.
    fn remove_fixup(&mut self, mut node: NodeIdx) {
        while node != self.root && !self.arena[node].red {
            let parent = self.arena[node].parent;

            if node == self.arena[parent].left {
                let mut sibling = self.arena[parent].right;
                if sibling.is_nil() {
                    break;
                }

                if self.arena[sibling].red {
                    self.arena[sibling].red = false;
                    self.arena[parent].red = true;
                    self.left_rotate(parent);
                    sibling = self.arena[parent].right;
                }

                let sl = self.arena[sibling].left;
                let sr = self.arena[sibling].right;
                if !self.arena[sl].red && !self.arena[sr].red {
                    self.arena[sibling].red = true;
                    node = parent;
                } else {
                    if !self.arena[sr].red {
                        self.arena[sl].red = false;
                        self.arena[sibling].red = true;
                        self.right_rotate(sibling);
                        sibling = self.arena[parent].right;
                    }

                    let parent_red = self.arena[parent].red;
                    self.arena[sibling].red = parent_red;
                    self.arena[parent].red = false;
                    let sr = self.arena[sibling].right;
                    self.arena[sr].red = false;
                    self.left_rotate(parent);
                    node = self.root;
                }
            } else {
                let mut sibling = self.arena[parent].left;
                if sibling.is_nil() {
                    break;
                }

                if self.arena[sibling].red {
                    self.arena[sibling].red = false;
                    self.arena[parent].red = true;
                    self.right_rotate(parent);
                    sibling = self.arena[parent].left;
                }

                let sl = self.arena[sibling].left;
                let sr = self.arena[sibling].right;
                if !self.arena[sl].red && !self.arena[sr].red {
                    self.arena[sibling].red = true;
                    node = parent;
                } else {
                    if !self.arena[sl].red {
                        self.arena[sr].red = false;
                        self.arena[sibling].red = true;
                        self.left_rotate(sibling);
                        sibling = self.arena[parent].left;
                    }

                    let parent_red = self.arena[parent].red;
                    self.arena[sibling].red = parent_red;
                    self.arena[parent].red = false;
                    let sl = self.arena[sibling].left;
                    self.arena[sl].red = false;
                    self.right_rotate(parent);
                    node = self.root;
                }
            }
        }

        self.arena[node].red = false;
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    fn left_rotate(&mut self, node: NodeIdx) {
        let right = self.arena[node].right;
        let grandchild = self.arena[right].left;

        self.arena[node].right = grandchild;
        if !grandchild.is_nil() {
            self.arena[grandchild].parent = node;
        }

        let parent = self.arena[node].parent;
        self.arena[right].parent = parent;

        if parent.is_nil() {
            self.root = right;
        } else if node == self.arena[parent].left {
            self.arena[parent].left = right;
        } else {
            self.arena[parent].right = right;
        }

        self.arena[right].left = node;
        self.arena[node].parent = right;

        A::on_rotated(self, node, right);
    }

    fn right_rotate(&mut self, node: NodeIdx) {
        let left = self.arena[node].left;
        let grandchild = self.arena[left].right;

        self.arena[node].left = grandchild;
        if !grandchild.is_nil() {
            self.arena[grandchild].parent = node;
        }

        let parent = self.arena[node].parent;
        self.arena[left].parent = parent;

        if parent.is_nil() {
            self.root = left;
        } else if node == self.arena[parent].right {
            self.arena[parent].right = left;
        } else {
            self.arena[parent].left = left;
        }

        self.arena[left].right = node;
        self.arena[node].parent = left;

        A::on_rotated(self, node, left);
    }

    // =========================================================================
    // Keyed lookup
    // =========================================================================

    /// The node holding `key`, if any.
    pub fn node_by_key(&self, key: &K) -> Option<NodeIdx> {
        let mut node = self.root;
        while !node.is_nil() {
            match key.cmp(self.key_unchecked(node)) {
                Ordering::Less => node = self.arena[node].left,
                Ordering::Greater => node = self.arena[node].right,
                Ordering::Equal => return Some(node),
            }
        }
        return None;
    }

    /// Coordinates of every value stored under `key`, insertion order.
    pub fn coordinates_by_key<'a>(
        &'a self,
        key: &K,
    ) -> impl Iterator<Item = Coordinate> + use<'a, K, V, A> {
        let node = self.node_by_key(key);
        return node.into_iter().flat_map(move |n| self.node_coordinates(n));
    }

    /// Values stored under `key`, insertion order. Empty for an absent
    /// key.
    pub fn values_by_key<'a>(
        &'a self,
        key: &K,
    ) -> impl Iterator<Item = &'a V> + use<'a, K, V, A> {
        let node = self.node_by_key(key);
        return node.into_iter().flat_map(move |n| self.node_values(n));
    }

    /// Coordinate of the first value under `key` equal to `value`.
    pub fn coordinate_of(&self, key: &K, value: &V) -> Option<Coordinate>
    where
        V: PartialEq,
    {
        return self
            .coordinates_by_key(key)
            .find(|&c| self.value(c) == Some(value));
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Coordinate of the first value of the leftmost node.
    pub fn minimum(&self) -> Option<Coordinate> {
        return self.minimum_from(self.root);
    }

    /// Coordinate of the last value of the rightmost node.
    pub fn maximum(&self) -> Option<Coordinate> {
        return self.maximum_from(self.root);
    }

    /// Minimum coordinate within the subtree rooted at `node`.
    pub fn minimum_in(&self, node: NodeIdx) -> Option<Coordinate> {
        self.arena.get(node)?;
        return self.minimum_from(node);
    }

    /// Maximum coordinate within the subtree rooted at `node`.
    pub fn maximum_in(&self, node: NodeIdx) -> Option<Coordinate> {
        self.arena.get(node)?;
        return self.maximum_from(node);
    }

    fn minimum_from(&self, node: NodeIdx) -> Option<Coordinate> {
        if node.is_nil() {
            return None;
        }
        let n = self.minimum_node(node);
        let slot = self.arena[n].first_slot()?;
        return Some(self.make_coord(n, slot));
    }

    fn maximum_from(&self, node: NodeIdx) -> Option<Coordinate> {
        if node.is_nil() {
            return None;
        }
        let mut n = node;
        while !self.arena[n].right.is_nil() {
            n = self.arena[n].right;
        }
        let slot = self.arena[n].last_slot()?;
        return Some(self.make_coord(n, slot));
    }

    fn minimum_node(&self, mut node: NodeIdx) -> NodeIdx {
        while !self.arena[node].left.is_nil() {
            node = self.arena[node].left;
        }
        return node;
    }

    /// In-order successor coordinate: the next value in the same node's
    /// list, else the minimum of the right subtree, else the nearest
    /// ancestor reached from a left child. `None` past the end or for a
    /// stale coordinate.
    pub fn next_coordinate(&self, coord: Coordinate) -> Option<Coordinate> {
        let (node, slot) = self.resolve(coord)?;

        if let Some(s) = self.arena[node].slot_after(slot) {
            return Some(self.make_coord(node, s));
        }

        let right = self.arena[node].right;
        if !right.is_nil() {
            return self.minimum_from(right);
        }

        let mut n = node;
        let mut p = self.arena[n].parent;
        while !p.is_nil() {
            if n == self.arena[p].left {
                let s = self.arena[p].first_slot()?;
                return Some(self.make_coord(p, s));
            }
            n = p;
            p = self.arena[n].parent;
        }
        return None;
    }

    /// In-order predecessor coordinate; mirror of
    /// [`next_coordinate`](Self::next_coordinate).
    pub fn prev_coordinate(&self, coord: Coordinate) -> Option<Coordinate> {
        let (node, slot) = self.resolve(coord)?;

        if let Some(s) = self.arena[node].slot_before(slot) {
            return Some(self.make_coord(node, s));
        }

        let left = self.arena[node].left;
        if !left.is_nil() {
            return self.maximum_from(left);
        }

        let mut n = node;
        let mut p = self.arena[n].parent;
        while !p.is_nil() {
            if n == self.arena[p].right {
                let s = self.arena[p].last_slot()?;
                return Some(self.make_coord(p, s));
            }
            n = p;
            p = self.arena[n].parent;
        }
        return None;
    }

    /// Last coordinate whose key is strictly below `threshold`; an
    /// exact key match is skipped with one predecessor step.
    pub fn last_below(&self, threshold: &K) -> Option<Coordinate> {
        let mut node = self.root;

        while !node.is_nil() {
            let cmp = threshold.cmp(self.key_unchecked(node));
            if cmp == Ordering::Equal {
                let first = self.arena[node].first_slot()?;
                return self.prev_coordinate(self.make_coord(node, first));
            }

            let next = if cmp == Ordering::Greater {
                self.arena[node].right
            } else {
                self.arena[node].left
            };

            if next.is_nil() {
                if cmp == Ordering::Greater {
                    let last = self.arena[node].last_slot()?;
                    return Some(self.make_coord(node, last));
                }
                let first = self.arena[node].first_slot()?;
                return self.prev_coordinate(self.make_coord(node, first));
            }

            node = next;
        }

        return None;
    }

    /// First coordinate whose key is strictly above `threshold`; an
    /// exact key match is skipped with one successor step.
    pub fn first_above(&self, threshold: &K) -> Option<Coordinate> {
        let mut node = self.root;

        while !node.is_nil() {
            let cmp = threshold.cmp(self.key_unchecked(node));
            if cmp == Ordering::Equal {
                let last = self.arena[node].last_slot()?;
                return self.next_coordinate(self.make_coord(node, last));
            }

            let next = if cmp == Ordering::Greater {
                self.arena[node].right
            } else {
                self.arena[node].left
            };

            if next.is_nil() {
                if cmp == Ordering::Greater {
                    let last = self.arena[node].last_slot()?;
                    return self.next_coordinate(self.make_coord(node, last));
                }
                let first = self.arena[node].first_slot()?;
                return Some(self.make_coord(node, first));
            }

            node = next;
        }

        return None;
    }

    /// Lazy in-order walk over every coordinate, smallest key first.
    ///
    /// Driven by repeated successor steps against the live structure;
    /// restartable, but like every iterator here it borrows the tree,
    /// so the structure cannot change underneath it.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        return std::iter::successors(self.minimum(), move |&c| self.next_coordinate(c));
    }

    /// Every stored value in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        return self.coordinates().filter_map(move |c| self.value(c));
    }

    // =========================================================================
    // Coordinate and node accessors
    // =========================================================================

    /// Key of a coordinate's node; `None` if stale.
    pub fn key(&self, coord: Coordinate) -> Option<&K> {
        let (node, _) = self.resolve(coord)?;
        return self.arena[node].key.as_ref();
    }

    /// Value a coordinate points at; `None` if stale.
    pub fn value(&self, coord: Coordinate) -> Option<&V> {
        let (node, slot) = self.resolve(coord)?;
        return self.arena[node].values[slot as usize].as_ref();
    }

    /// Mutable access to a coordinate's value; `None` if stale.
    pub fn value_mut(&mut self, coord: Coordinate) -> Option<&mut V> {
        let (node, slot) = self.resolve(coord)?;
        return self.arena[node].values[slot as usize].as_mut();
    }

    /// Whether the coordinate still points at a live value in this
    /// tree.
    pub fn contains_coordinate(&self, coord: Coordinate) -> bool {
        return self.resolve(coord).is_some();
    }

    /// Overwrite the key of a coordinate's node in place, without
    /// re-linking the node.
    ///
    /// This is the escape hatch for rescaling a contiguous key range:
    /// the caller is responsible for never reordering the key relative
    /// to neighboring nodes. The tree does not verify this; breaking
    /// the order silently corrupts every keyed operation. Returns
    /// `false` only for a stale coordinate.
    pub fn set_key_in_place(&mut self, coord: Coordinate, key: K) -> bool {
        let Some((node, _)) = self.resolve(coord) else {
            return false;
        };
        self.arena[node].key = Some(key);
        return true;
    }

    /// Root node, `None` when empty.
    pub fn root(&self) -> Option<NodeIdx> {
        if self.root.is_nil() {
            return None;
        }
        return Some(self.root);
    }

    pub fn left(&self, node: NodeIdx) -> Option<NodeIdx> {
        let n = self.arena.get(node)?;
        if n.left.is_nil() {
            return None;
        }
        return Some(n.left);
    }

    pub fn right(&self, node: NodeIdx) -> Option<NodeIdx> {
        let n = self.arena.get(node)?;
        if n.right.is_nil() {
            return None;
        }
        return Some(n.right);
    }

    pub fn parent(&self, node: NodeIdx) -> Option<NodeIdx> {
        let n = self.arena.get(node)?;
        if n.parent.is_nil() {
            return None;
        }
        return Some(n.parent);
    }

    pub fn is_red(&self, node: NodeIdx) -> bool {
        return self.arena.get(node).is_some_and(|n| n.red);
    }

    pub fn node_key(&self, node: NodeIdx) -> Option<&K> {
        return self.arena.get(node)?.key.as_ref();
    }

    /// The node's augmentation slot (subtree max end), if maintained.
    pub fn node_max(&self, node: NodeIdx) -> Option<&K> {
        return self.arena.get(node)?.max.as_ref();
    }

    /// Live values of one node, insertion order.
    pub fn node_values(&self, node: NodeIdx) -> impl Iterator<Item = &V> {
        let slots = self
            .arena
            .get(node)
            .map(|n| n.values.as_slice())
            .unwrap_or(&[]);
        return slots.iter().filter_map(|v| v.as_ref());
    }

    /// Coordinates of one node's live values, insertion order.
    pub fn node_coordinates(&self, node: NodeIdx) -> impl Iterator<Item = Coordinate> + '_ {
        let count = self.arena.get(node).map_or(0, |n| n.values.len());
        return (0..count).filter_map(move |s| {
            if self.arena[node].values[s].is_some() {
                return Some(self.make_coord(node, s as u32));
            }
            return None;
        });
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn make_coord(&self, node: NodeIdx, slot: u32) -> Coordinate {
        return Coordinate {
            tree: self.id,
            node,
            generation: self.arena[node].generation,
            slot,
        };
    }

    /// Check a coordinate against this tree: right tree, live slot,
    /// matching generation. Stale coordinates resolve to `None`.
    fn resolve(&self, coord: Coordinate) -> Option<(NodeIdx, u32)> {
        if coord.tree != self.id {
            return None;
        }
        let node = self.arena.get(coord.node)?;
        if node.generation != coord.generation {
            return None;
        }
        node.values.get(coord.slot as usize)?.as_ref()?;
        return Some((coord.node, coord.slot));
    }

    /// Key of a non-sentinel node. Only the sentinel lacks a key, and
    /// callers never pass it here.
    #[inline(always)]
    fn key_unchecked(&self, node: NodeIdx) -> &K {
        return self.arena[node].key.as_ref().expect("sentinel has no key");
    }
}

impl<K: Ord, V, A: Augment<K, V>> Default for RbTree<K, V, A> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Structural deep copy: new node graph with the same shape, colors,
/// keys, and augmentation slots. Values are cloned (Rust ownership
/// rules out the original's by-reference sharing). The clone gets a
/// fresh tree identity, so coordinates minted by the source tree do not
/// validate against it.
impl<K: Clone, V: Clone, A: Clone> Clone for RbTree<K, V, A> {
    fn clone(&self) -> Self {
        return RbTree {
            arena: self.arena.clone(),
            root: self.root,
            len: self.len,
            id: next_tree_id(),
            aug: self.aug.clone(),
        };
    }
}
