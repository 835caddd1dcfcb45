//! keyspan - an augmented red-black interval index.
//!
//! Two layers, one arena:
//! - [`RbTree`] is a red-black multi-map. Equal keys share a node, so
//!   duplicate-heavy workloads never rebalance on a repeat insert.
//!   Values are addressed through [`Coordinate`]s, stable handles that
//!   survive rebalancing and detect their own staleness.
//! - [`IntervalTree`] layers a subtree-max-end augmentation on top
//!   through the [`Augment`] hook trait, giving O(log n + k) stabbing
//!   queries over intervals keyed by their start coordinate.
//!
//! Nodes live in a `Vec` arena addressed by `u32` indices, with the
//! sentinel at slot zero standing in for every nil link.
//!
//! # Quick Start
//!
//! ```
//! use keyspan::IntervalTree;
//!
//! let mut tree: IntervalTree<u32, std::ops::Range<u32>> = IntervalTree::new();
//! tree.add(10..20);
//! tree.add(15..40);
//! let inner = tree.add(25..30);
//!
//! // Hits come back ascending by start coordinate.
//! let starts: Vec<u32> = tree
//!     .search(26)
//!     .map(|c| tree.value(c).unwrap().start)
//!     .collect();
//! assert_eq!(starts, vec![15, 25]);
//!
//! // Strict containment on both sides: starts and ends do not match.
//! assert_eq!(tree.search(20).count(), 1); // only 15..40
//!
//! tree.remove(inner);
//! assert_eq!(tree.search(26).count(), 1);
//! ```

pub mod coord;
pub mod interval;
pub mod node;
pub mod tree;

pub use coord::Coordinate;
pub use interval::{Interval, IntervalMax, IntervalTree, Search};
pub use node::NodeIdx;
pub use tree::{Augment, NoAugment, RbTree};
