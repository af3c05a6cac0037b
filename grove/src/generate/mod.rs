//! Generation contract: the external collaborator that writes and scores new nodes.
//!
//! The growth engine hands a [`GenerationRequest`] (parent contents plus optional
//! instruction and criteria) to a [`Generator`] and gets back a [`GeneratedContent`]
//! or a [`GenerateError`]. [`LlmGenerator`] implements the contract with two LLM calls:
//! one to write the item, one to review it.

mod llm_generator;
mod prompt;

pub use llm_generator::LlmGenerator;
pub use prompt::{DEFAULT_CRITERIA, DEFAULT_INSTRUCTION};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::node::Node;

/// Content of one parent as sent to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentContent {
    pub title: String,
    pub body: String,
}

impl From<&Node> for ParentContent {
    fn from(node: &Node) -> Self {
        Self {
            title: node.title.clone(),
            body: node.body.clone(),
        }
    }
}

/// Request for one new node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Parent contents in selection order.
    pub parents: Vec<ParentContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
}

/// Generator result. `score` is `None` when the reviewer gave nothing usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    #[serde(alias = "abstract")]
    pub body: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Collaborator failure; the growth cycle aborts and nothing is committed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    /// The LLM call itself failed.
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),
    /// The reply could not be decoded into the expected shape.
    #[error("unusable generator output: {0}")]
    Decode(String),
    #[error("generator timed out after {0:?}")]
    Timeout(Duration),
}

/// The generation collaborator consumed by [`GrowthEngine`](crate::grow::GrowthEngine).
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerateError>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerateError> {
        (**self).generate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Response JSON accepts `abstract` as the body field; score optional.
    #[test]
    fn generated_content_accepts_abstract_alias() {
        let c: GeneratedContent =
            serde_json::from_str(r#"{"title":"T","abstract":"B","score":0.8}"#).unwrap();
        assert_eq!(c.body, "B");
        assert_eq!(c.score, Some(0.8));
        let c: GeneratedContent = serde_json::from_str(r#"{"title":"T","body":"B"}"#).unwrap();
        assert_eq!(c.score, None);
    }

    #[test]
    fn request_omits_absent_instruction() {
        let req = GenerationRequest {
            parents: vec![ParentContent {
                title: "t".into(),
                body: "b".into(),
            }],
            instruction: None,
            criteria: Some("Clarity".into()),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("instruction").is_none());
        assert_eq!(v["criteria"], "Clarity");
        assert_eq!(v["parents"][0]["title"], "t");
    }
}
