//! Descendant aggregation: depth-decayed descendant count and evaluation sum.
//!
//! Traversal goes forward along `children` with an explicit stack and a visited set.
//! Children are explored in link order, depth-first pre-order, so a node reachable through
//! several paths is counted once, at the depth of the first path in that order. The
//! result is reproducible for a given store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeId};
use crate::store::GraphStore;

/// Default decay factor per child edge.
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Decayed descendant totals for one root.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescendantStats {
    /// Sum of `alpha^depth` over visited nodes (root included).
    pub count: f64,
    /// Sum of `evaluation * alpha^depth` over visited nodes (root included).
    pub sum_evaluations: f64,
}

/// A node annotated with its descendant stats; the selector's input.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub node: Node,
    pub num_descendants: f64,
    pub sum_evaluations: f64,
}

/// Computes both totals for `root` in one traversal. Unknown root yields zeros.
pub fn descendant_stats(store: &GraphStore, root: &NodeId, alpha: f64) -> DescendantStats {
    let mut stats = DescendantStats::default();
    if !store.contains(root) {
        return stats;
    }

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut stack: Vec<(&NodeId, i32)> = vec![(root, 0)];
    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = store.get(id) else {
            continue;
        };
        let weight = alpha.powi(depth);
        stats.count += weight;
        stats.sum_evaluations += node.evaluation * weight;
        // Reverse push so the first child is popped first.
        for child in node.children.iter().rev() {
            if !visited.contains(child) {
                stack.push((child, depth + 1));
            }
        }
    }
    stats
}

/// Sum of `alpha^depth` over every distinct node reachable from `root`, root included.
pub fn count_descendants(store: &GraphStore, root: &NodeId, alpha: f64) -> f64 {
    descendant_stats(store, root, alpha).count
}

/// Sum of `evaluation * alpha^depth` over every distinct node reachable from `root`.
pub fn sum_descendants_evaluations(store: &GraphStore, root: &NodeId, alpha: f64) -> f64 {
    descendant_stats(store, root, alpha).sum_evaluations
}

/// Annotates every node of the store, in insertion order.
pub fn annotate(store: &GraphStore, alpha: f64) -> Vec<Candidate> {
    store
        .all()
        .into_iter()
        .map(|node| {
            let stats = descendant_stats(store, &node.id, alpha);
            Candidate {
                node,
                num_descendants: stats.count,
                sum_evaluations: stats.sum_evaluations,
            }
        })
        .collect()
}
