//! Parent selection: eligibility filter plus UCT ranking.
//!
//! UCT score per eligible candidate, with `N` the eligible pool size:
//!
//! ```text
//! exploitation = sum_evaluations / max(num_descendants, 1)
//! exploration  = sqrt(2 * ln(N) / max(num_descendants, 1))
//! score        = exploitation + C * exploration
//! ```
//!
//! The top `K` scores are taken greedily; ties go to the earlier pool entry.

use std::collections::HashMap;
use std::str::FromStr;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::aggregate::Candidate;
use crate::node::NodeId;

/// Default exploration constant `C`.
pub const DEFAULT_EXPLORATION: f64 = 0.1;
/// Default number of parents per growth cycle.
pub const DEFAULT_NUM_PARENTS: usize = 2;
/// Default minimum child count a parent needs before its children become eligible.
pub const DEFAULT_BRANCHING_THRESHOLD: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The eligible pool is empty (empty graph or everything filtered out).
    #[error("no eligible candidates; add more seed nodes")]
    NoEligibleCandidates,
}

/// How parents are picked for a growth cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// Eligibility filter + UCT ranking.
    #[default]
    Uct,
    /// Uniformly random distinct nodes from the whole pool.
    Random,
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uct" => Ok(Self::Uct),
            "random" => Ok(Self::Random),
            _ => Err(format!("unknown strategy: {} (use uct or random)", s)),
        }
    }
}

/// Selector tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorParams {
    /// Exploration constant `C`.
    pub exploration: f64,
    /// Requested parent count `K`; 0 is treated as 1.
    pub num_parents: usize,
    pub branching_threshold: usize,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            num_parents: DEFAULT_NUM_PARENTS,
            branching_threshold: DEFAULT_BRANCHING_THRESHOLD,
        }
    }
}

/// One scored eligible candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub id: NodeId,
    pub exploitation: f64,
    pub exploration: f64,
    pub score: f64,
}

/// Returns the candidates that pass the branching guard, in pool order.
///
/// A non-seed candidate is dropped when every one of its parents has fewer than
/// `threshold` children. Parents missing from the pool do not count as "fewer".
pub fn eligible(pool: &[Candidate], threshold: usize) -> Vec<&Candidate> {
    let child_counts: HashMap<&NodeId, usize> = pool
        .iter()
        .map(|c| (&c.node.id, c.node.children.len()))
        .collect();
    pool.iter()
        .filter(|c| {
            let parents = &c.node.parents;
            let all_parents_thin = parents
                .iter()
                .all(|p| child_counts.get(p).is_some_and(|&n| n < threshold));
            parents.is_empty() || !all_parents_thin
        })
        .collect()
}

/// UCT scores of the eligible pool, in pool order.
pub fn uct_scores(pool: &[Candidate], params: &SelectorParams) -> Vec<ScoredCandidate> {
    let eligible = eligible(pool, params.branching_threshold);
    let n = eligible.len() as f64;
    eligible
        .into_iter()
        .map(|c| {
            let visits = c.num_descendants.max(1.0);
            let exploitation = c.sum_evaluations / visits;
            let exploration = if n > 0.0 {
                (2.0 * n.ln() / visits).sqrt()
            } else {
                0.0
            };
            ScoredCandidate {
                id: c.node.id.clone(),
                exploitation,
                exploration,
                score: exploitation + params.exploration * exploration,
            }
        })
        .collect()
}

/// Picks up to `K` parents by UCT score. Fewer than `K` eligible ⇒ all of them.
pub fn select_parents(
    pool: &[Candidate],
    params: &SelectorParams,
) -> Result<Vec<NodeId>, SelectError> {
    let mut scored = uct_scores(pool, params);
    if scored.is_empty() {
        return Err(SelectError::NoEligibleCandidates);
    }
    let k = params.num_parents.max(1);
    let mut chosen = Vec::with_capacity(k.min(scored.len()));
    while chosen.len() < k && !scored.is_empty() {
        let mut best = 0;
        for (i, c) in scored.iter().enumerate().skip(1) {
            if c.score > scored[best].score {
                best = i;
            }
        }
        let picked = scored.remove(best);
        tracing::debug!(
            node_id = %picked.id,
            score = picked.score,
            exploitation = picked.exploitation,
            exploration = picked.exploration,
            "uct pick"
        );
        chosen.push(picked.id);
    }
    Ok(chosen)
}

/// Picks up to `K` distinct nodes uniformly at random from the whole pool.
pub fn select_random(
    pool: &[Candidate],
    num_parents: usize,
    rng: &mut StdRng,
) -> Result<Vec<NodeId>, SelectError> {
    if pool.is_empty() {
        return Err(SelectError::NoEligibleCandidates);
    }
    let k = num_parents.max(1).min(pool.len());
    let mut picked: Vec<usize> = rand::seq::index::sample(rng, pool.len(), k).into_vec();
    picked.sort_unstable();
    Ok(picked.into_iter().map(|i| pool[i].node.id.clone()).collect())
}

/// Dispatches on `strategy`.
pub fn select(
    strategy: SelectionStrategy,
    pool: &[Candidate],
    params: &SelectorParams,
    rng: &mut StdRng,
) -> Result<Vec<NodeId>, SelectError> {
    match strategy {
        SelectionStrategy::Uct => select_parents(pool, params),
        SelectionStrategy::Random => select_random(pool, params.num_parents, rng),
    }
}
