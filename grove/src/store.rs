//! Graph store: the single owner of the node DAG.
//!
//! Every mutation validates first and only then writes, so a rejected call leaves the
//! store untouched. Acyclicity holds structurally: a node may only name parents that
//! already exist, and `parents` never changes after insertion.
//!
//! **Interaction**: Owned by [`GrowthEngine`](crate::grow::GrowthEngine) behind a lock;
//! read by [`aggregate`](crate::aggregate) through snapshots.

use std::collections::{HashMap, HashSet};

use crate::node::{is_valid_evaluation, NewNode, Node, NodeId};

/// Store contract violation. Fatal to the offending call only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node with this id already exists.
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
    /// A parent named by a new node is not in the store.
    #[error("node {node} names unknown parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },
    #[error("node not found: {0}")]
    NotFound(NodeId),
    /// Evaluation outside `[0, 1]` or not finite.
    #[error("evaluation {value} for node {id} is outside [0, 1]")]
    OutOfRange { id: NodeId, value: f64 },
    /// `link_child` called for an edge the child does not declare.
    #[error("{parent} is not a parent of {child}")]
    NotAParent { parent: NodeId, child: NodeId },
    /// Invariant check failed (see [`GraphStore::check_consistency`]).
    #[error("graph is inconsistent: {0}")]
    Inconsistent(String),
}

/// In-memory DAG of nodes, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_or_err(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.get(id).ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    /// Snapshot of every node in insertion order.
    pub fn all(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    /// Inserts `node` without touching any other node's `children`.
    ///
    /// Fails with `DuplicateId`, `DanglingParent` or `OutOfRange`. Repeated parent ids
    /// are collapsed, keeping the first occurrence. Callers that want the inverse index
    /// maintained use [`add_node`](Self::add_node).
    pub fn insert(&mut self, mut node: Node) -> Result<(), GraphError> {
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        if !is_valid_evaluation(node.evaluation) {
            return Err(GraphError::OutOfRange {
                id: node.id,
                value: node.evaluation,
            });
        }
        if let Some(parent) = node.parents.iter().find(|p| !self.contains(p)) {
            return Err(GraphError::DanglingParent {
                node: node.id.clone(),
                parent: parent.clone(),
            });
        }
        let mut seen = HashSet::new();
        node.parents.retain(|p| seen.insert(p.clone()));
        node.children.clear();

        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Appends `child_id` to the parent's `children` unless already present.
    pub fn link_child(&mut self, parent_id: &NodeId, child_id: &NodeId) -> Result<(), GraphError> {
        let child = self.get_or_err(child_id)?;
        if !child.parents.contains(parent_id) {
            return Err(GraphError::NotAParent {
                parent: parent_id.clone(),
                child: child_id.clone(),
            });
        }
        let &pi = self
            .index
            .get(parent_id)
            .ok_or_else(|| GraphError::NotFound(parent_id.clone()))?;
        let children = &mut self.nodes[pi].children;
        if !children.contains(child_id) {
            children.push(child_id.clone());
        }
        Ok(())
    }

    /// Replaces the evaluation of `id`; all other fields stay as they are.
    pub fn update_evaluation(&mut self, id: &NodeId, value: f64) -> Result<(), GraphError> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        if !is_valid_evaluation(value) {
            return Err(GraphError::OutOfRange {
                id: id.clone(),
                value,
            });
        }
        self.nodes[i].evaluation = value;
        Ok(())
    }

    /// Inserts a new node and links it under each of its parents.
    ///
    /// The only mutation path used by seeding and growth.
    pub fn add_node(&mut self, new: NewNode) -> Result<NodeId, GraphError> {
        let node = new.into_node();
        let id = node.id.clone();
        self.insert(node)?;
        let parents = self.get_or_err(&id)?.parents.clone();
        for parent in &parents {
            self.link_child(parent, &id)?;
        }
        Ok(id)
    }

    /// Topological order of all ids (parents before children), or `None` on a cycle.
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        let mut in_degree: HashMap<&NodeId, usize> =
            self.nodes.iter().map(|n| (&n.id, 0)).collect();
        for node in &self.nodes {
            for child in &node.children {
                if let Some(d) = in_degree.get_mut(child) {
                    *d += 1;
                }
            }
        }

        let mut queue: Vec<&NodeId> = self
            .nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| in_degree[id] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = queue.pop() {
            order.push(id.clone());
            let Some(node) = self.get(id) else { continue };
            for child in &node.children {
                if let Some(d) = in_degree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push(child);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Some(order)
        } else {
            None
        }
    }

    /// Verifies the store invariants: no dangling references, `children` is exactly the
    /// inverse of `parents`, evaluations in range, and no directed cycle.
    pub fn check_consistency(&self) -> Result<(), GraphError> {
        for node in &self.nodes {
            if !is_valid_evaluation(node.evaluation) {
                return Err(GraphError::Inconsistent(format!(
                    "{} has evaluation {}",
                    node.id, node.evaluation
                )));
            }
            for parent in &node.parents {
                let p = self.get(parent).ok_or_else(|| {
                    GraphError::Inconsistent(format!("{} names missing parent {}", node.id, parent))
                })?;
                if !p.children.contains(&node.id) {
                    return Err(GraphError::Inconsistent(format!(
                        "{} missing from children of {}",
                        node.id, parent
                    )));
                }
            }
            for child in &node.children {
                let c = self.get(child).ok_or_else(|| {
                    GraphError::Inconsistent(format!("{} names missing child {}", node.id, child))
                })?;
                if !c.parents.contains(&node.id) {
                    return Err(GraphError::Inconsistent(format!(
                        "{} lists child {} that does not name it as parent",
                        node.id, child
                    )));
                }
            }
        }
        if self.topological_order().is_none() {
            return Err(GraphError::Inconsistent("cycle detected".to_string()));
        }
        Ok(())
    }
}
