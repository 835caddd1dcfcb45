//! Structural conformance tests for the red-black multi-map: balance
//! invariants, count bookkeeping, coordinate stability, and the strict
//! threshold queries, all driven through the public API.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use keyspan::{Coordinate, NodeIdx, RbTree};

// =============================================================================
// Red-black validity checkers
// =============================================================================

/// Black height of a subtree; panics on any red-black violation.
fn black_height(tree: &RbTree<i64, u64>, node: Option<NodeIdx>) -> u32 {
    let Some(n) = node else {
        return 1;
    };

    if tree.is_red(n) {
        for child in [tree.left(n), tree.right(n)].into_iter().flatten() {
            assert!(!tree.is_red(child), "red node with red child");
        }
    }

    for child in [tree.left(n), tree.right(n)].into_iter().flatten() {
        assert_eq!(tree.parent(child), Some(n), "broken parent link");
    }

    let lh = black_height(tree, tree.left(n));
    let rh = black_height(tree, tree.right(n));
    assert_eq!(lh, rh, "unequal black heights below key {:?}", tree.node_key(n));

    if tree.is_red(n) {
        return lh;
    }
    return lh + 1;
}

fn assert_red_black_valid(tree: &RbTree<i64, u64>) {
    if let Some(root) = tree.root() {
        assert!(!tree.is_red(root), "red root");
        assert!(tree.parent(root).is_none());
    }
    black_height(tree, tree.root());
}

/// Check len() against a walk, node count against distinct keys, and
/// key ordering along the walk.
fn assert_bookkeeping(tree: &RbTree<i64, u64>, expected_len: usize) {
    assert_eq!(tree.len(), expected_len);
    assert_eq!(tree.coordinates().count(), expected_len);

    let mut distinct: FxHashSet<i64> = FxHashSet::default();
    let mut nodes: FxHashSet<NodeIdx> = FxHashSet::default();
    let mut prev: Option<i64> = None;
    for coord in tree.coordinates() {
        let key = *tree.key(coord).unwrap();
        if let Some(p) = prev {
            assert!(p <= key, "keys out of order: {p} then {key}");
        }
        prev = Some(key);
        distinct.insert(key);
        nodes.insert(coord.node());
    }
    assert_eq!(nodes.len(), distinct.len(), "node per distinct key");
}

// =============================================================================
// Randomized add/remove storms
// =============================================================================

#[test]
fn random_churn_preserves_all_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let mut live: Vec<Coordinate> = Vec::new();
    let mut next_value = 0u64;

    for round in 0..3_000 {
        let remove = !live.is_empty() && rng.gen_bool(0.4);
        if remove {
            let i = rng.gen_range(0..live.len());
            let coord = live.swap_remove(i);
            assert!(tree.remove(coord));
            assert!(!tree.contains_coordinate(coord));
        } else {
            // A narrow key range forces heavy duplication.
            let key = rng.gen_range(-50..50i64);
            let coord = tree.insert(key, next_value);
            next_value += 1;
            live.push(coord);
        }

        if round % 100 == 0 {
            assert_red_black_valid(&tree);
            assert_bookkeeping(&tree, live.len());
        }
    }

    assert_red_black_valid(&tree);
    assert_bookkeeping(&tree, live.len());

    // Drain completely.
    for coord in live.drain(..) {
        assert!(tree.remove(coord));
    }
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
}

#[test]
fn values_are_never_disturbed_by_rebalancing() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let mut coords = Vec::new();

    for i in 0..500u64 {
        coords.push((tree.insert((i as i64 * 7919) % 257, i), i));
    }
    // Every coordinate handed out still reads back its own value.
    for &(coord, value) in &coords {
        assert_eq!(tree.value(coord), Some(&value));
    }

    for &(coord, _) in coords.iter().step_by(2) {
        assert!(tree.remove(coord));
    }
    for (i, &(coord, value)) in coords.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(tree.value(coord), None);
        } else {
            assert_eq!(tree.value(coord), Some(&value));
        }
    }
}

// =============================================================================
// Coordinate staleness
// =============================================================================

#[test]
fn reused_node_slot_rejects_old_coordinates() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let old = tree.insert(1, 10);
    assert!(tree.remove(old));

    // The freed arena slot comes back for the next node; the stale
    // coordinate must not alias into it.
    let fresh = tree.insert(2, 20);
    assert!(!tree.contains_coordinate(old));
    assert!(tree.value(old).is_none());
    assert!(!tree.remove(old));
    assert_eq!(tree.value(fresh), Some(&20));
}

#[test]
fn coordinates_do_not_cross_trees() {
    let mut a: RbTree<i64, u64> = RbTree::new();
    let mut b: RbTree<i64, u64> = RbTree::new();
    let ca = a.insert(1, 10);
    let cb = b.insert(1, 10);

    assert!(!a.contains_coordinate(cb));
    assert!(!b.remove(ca));
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
}

#[test]
fn mutating_through_a_coordinate() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let coord = tree.insert(1, 10);
    *tree.value_mut(coord).unwrap() = 99;
    assert_eq!(tree.value(coord), Some(&99));
}

// =============================================================================
// Threshold queries
// =============================================================================

#[test]
fn thresholds_against_a_dense_tree() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    for k in (0..100i64).step_by(10) {
        tree.insert(k, k as u64);
        tree.insert(k, k as u64 + 1);
    }

    for probe in -5..105i64 {
        let below = tree.last_below(&probe).map(|c| *tree.key(c).unwrap());
        let above = tree.first_above(&probe).map(|c| *tree.key(c).unwrap());

        let expect_below = (0..100).step_by(10).filter(|&k| k < probe).max();
        let expect_above = (0..100).step_by(10).filter(|&k| k > probe).min();
        assert_eq!(below, expect_below, "last_below({probe})");
        assert_eq!(above, expect_above, "first_above({probe})");
    }
}

#[test]
fn threshold_on_exact_key_returns_edge_slots() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    for v in 0..3u64 {
        tree.insert(10, v);
        tree.insert(20, v);
        tree.insert(30, v);
    }

    // Skipping an exact key lands on the neighboring group's far slot.
    let below = tree.last_below(&20).unwrap();
    assert_eq!((*tree.key(below).unwrap(), *tree.value(below).unwrap()), (10, 2));

    let above = tree.first_above(&20).unwrap();
    assert_eq!((*tree.key(above).unwrap(), *tree.value(above).unwrap()), (30, 0));
}

// =============================================================================
// Clone and clear
// =============================================================================

#[test]
fn clone_preserves_structure_and_detaches_state() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree: RbTree<i64, u64> = RbTree::new();
    for i in 0..200u64 {
        tree.insert(rng.gen_range(-30..30i64), i);
    }

    let copy = tree.clone();
    assert_eq!(copy.len(), tree.len());
    let original: Vec<u64> = tree.values().copied().collect();
    let cloned: Vec<u64> = copy.values().copied().collect();
    assert_eq!(original, cloned);

    tree.clear();
    assert_eq!(copy.len(), 200);
    assert_eq!(copy.values().count(), 200);
}

#[test]
fn clear_then_reuse() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let stale: Vec<Coordinate> = (0..50).map(|i| tree.insert(i, i as u64)).collect();

    tree.clear();
    assert!(tree.is_empty());
    for coord in &stale {
        assert!(!tree.contains_coordinate(*coord));
    }

    for i in 0..50 {
        tree.insert(i, i as u64);
    }
    assert_eq!(tree.len(), 50);
    assert_red_black_valid(&tree);
    assert_bookkeeping(&tree, 50);
}
