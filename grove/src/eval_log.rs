//! Append-only log of `(node_id, evaluation)` pairs recorded by growth cycles.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub node_id: NodeId,
    pub evaluation: f64,
}

/// Ordered evaluation records; entries are never removed or rewritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationLog {
    records: Vec<EvaluationRecord>,
}

impl EvaluationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node_id: NodeId, evaluation: f64) {
        self.records.push(EvaluationRecord {
            node_id,
            evaluation,
        });
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean of all recorded evaluations, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.evaluation).sum();
        Some(sum / self.records.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_append_order() {
        let mut log = EvaluationLog::new();
        log.record("a".into(), 0.2);
        log.record("b".into(), 0.6);
        let ids: Vec<_> = log.records().iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!((log.mean().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn empty_log_has_no_mean() {
        assert!(EvaluationLog::new().mean().is_none());
    }

    /// **Scenario**: Serializes as a plain JSON array of pairs.
    #[test]
    fn serializes_as_array() {
        let mut log = EvaluationLog::new();
        log.record("n".into(), 0.8);
        let v = serde_json::to_value(&log).unwrap();
        assert_eq!(v, serde_json::json!([{"node_id": "n", "evaluation": 0.8}]));
    }
}
