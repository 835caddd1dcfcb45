//! Stable-until-invalidated handles to stored values.

use crate::node::NodeIdx;

/// A handle to one stored value: a node plus a position in that node's
/// value list.
///
/// A coordinate is a weak reference. It does not keep anything alive,
/// and it stops validating the instant its value is removed or its node
/// is detached from the tree; every accessor taking a coordinate
/// returns `None`/`false` for a stale one. A coordinate also carries
/// the identity of the tree that minted it, so it can never validate
/// against a different tree (including clones).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub(crate) tree: u64,
    pub(crate) node: NodeIdx,
    pub(crate) generation: u32,
    pub(crate) slot: u32,
}

impl Coordinate {
    /// The node this coordinate points into.
    ///
    /// The index is only meaningful for the minting tree, and only
    /// while the coordinate is still valid there.
    #[inline(always)]
    pub fn node(&self) -> NodeIdx {
        return self.node;
    }
}
