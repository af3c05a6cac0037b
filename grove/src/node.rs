//! Node data model: one content item in the growth DAG.
//!
//! Nodes are created as seeds (no parents) or as grown nodes (parents chosen by the
//! selector). After creation only `evaluation` and `children` change, both through
//! [`GraphStore`](crate::store::GraphStore).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Evaluation assigned when no usable external score is available.
pub const DEFAULT_EVALUATION: f64 = 0.5;

/// Opaque node identifier.
///
/// Generated nodes get a UUID v4; preset seeds use short ids such as `s1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly grown node.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A content node in the DAG.
///
/// `children` is maintained by the store as the inverse of every other node's `parents`;
/// callers never write it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    /// Description or abstract of the item.
    pub body: String,
    /// Nodes this one was derived from, in selection order. Empty for seeds.
    #[serde(default)]
    pub parents: Vec<NodeId>,
    /// Nodes derived from this one, in link order.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Quality score in `[0, 1]`.
    pub evaluation: f64,
}

impl Node {
    pub fn is_seed(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Insertion payload for [`GraphStore::add_node`](crate::store::GraphStore::add_node).
///
/// `id` is generated when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub id: Option<NodeId>,
    pub title: String,
    pub body: String,
    pub parents: Vec<NodeId>,
    pub evaluation: f64,
}

impl NewNode {
    /// Seed payload with the default evaluation.
    pub fn seed(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
            parents: vec![],
            evaluation: DEFAULT_EVALUATION,
        }
    }

    /// Grown payload derived from `parents`.
    pub fn child(title: impl Into<String>, body: impl Into<String>, parents: Vec<NodeId>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
            parents,
            evaluation: DEFAULT_EVALUATION,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_evaluation(mut self, evaluation: f64) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Builds the node with a concrete id and no children.
    pub(crate) fn into_node(self) -> Node {
        Node {
            id: self.id.unwrap_or_else(NodeId::generate),
            title: self.title,
            body: self.body,
            parents: self.parents,
            children: vec![],
            evaluation: self.evaluation,
        }
    }
}

/// True when `value` is a usable evaluation (finite, within `[0, 1]`).
pub fn is_valid_evaluation(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
