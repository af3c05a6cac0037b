use serde::Serialize;

use crate::node::NodeId;

/// Notification sent by [`GrowthEngine`](super::GrowthEngine) after each state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrowthEvent {
    NodeAdded {
        node_id: NodeId,
        title: String,
        parents: Vec<NodeId>,
        evaluation: f64,
    },
    CycleFailed {
        reason: String,
    },
    /// A trigger arrived while a cycle was in flight.
    CycleSkipped,
    EvaluationUpdated {
        node_id: NodeId,
        evaluation: f64,
    },
    SeedAdded {
        node_id: NodeId,
    },
}
