//! JSON export of a graph snapshot together with its evaluation log.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eval_log::EvaluationLog;
use crate::node::Node;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exported document: `{ "nodes": [...], "evaluations": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<Node>,
    pub evaluations: EvaluationLog,
}

impl GraphExport {
    pub fn to_json(&self, pretty: bool) -> Result<String, ExportError> {
        let s = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(s)
    }
}

/// Writes `export` as pretty JSON to `path`, creating parent directories.
pub fn write_json(path: impl AsRef<Path>, export: &GraphExport) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, export.to_json(true)?)?;
    tracing::info!(path = %path.display(), nodes = export.nodes.len(), "graph exported");
    Ok(())
}

/// Reads a document written by [`write_json`].
pub fn read_json(path: impl AsRef<Path>) -> Result<GraphExport, ExportError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NewNode;
    use crate::store::GraphStore;

    fn sample() -> GraphExport {
        let mut store = GraphStore::new();
        store.add_node(NewNode::seed("S", "seed").with_id("s1")).unwrap();
        store
            .add_node(
                NewNode::child("N", "grown", vec!["s1".into()])
                    .with_id("n")
                    .with_evaluation(0.8),
            )
            .unwrap();
        let mut evaluations = EvaluationLog::new();
        evaluations.record("n".into(), 0.8);
        GraphExport {
            nodes: store.all(),
            evaluations,
        }
    }

    /// **Scenario**: Document has top-level nodes and evaluations arrays.
    #[test]
    fn export_shape() {
        let v: serde_json::Value = serde_json::from_str(&sample().to_json(false).unwrap()).unwrap();
        assert_eq!(v["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(v["nodes"][0]["children"][0], "n");
        assert_eq!(v["evaluations"][0]["node_id"], "n");
        assert_eq!(v["evaluations"][0]["evaluation"], 0.8);
    }

    #[test]
    fn write_then_read_into_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("graph.json");
        let export = sample();
        write_json(&path, &export).unwrap();
        assert_eq!(read_json(&path).unwrap(), export);
    }
}
