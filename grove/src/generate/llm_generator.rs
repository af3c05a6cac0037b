//! LLM-backed [`Generator`]: a writer call followed by a reviewer call.
//!
//! The writer reply must decode to a title and body or the cycle fails. The reviewer
//! score (0–100) is normalized to `[0, 1]`; an unusable review yields `score: None`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::llm::LlmClient;
use crate::message::Message;

use super::prompt::{reviewer_prompt, writer_prompt, REVIEWER_SYSTEM, WRITER_SYSTEM};
use super::{
    GenerateError, GeneratedContent, GenerationRequest, Generator, DEFAULT_CRITERIA,
    DEFAULT_INSTRUCTION,
};

/// Generator that writes with one LLM call and reviews with a second.
pub struct LlmGenerator {
    llm: Arc<dyn LlmClient>,
}

impl LlmGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    async fn write(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerateError> {
        let instruction = request
            .instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_INSTRUCTION);
        let messages = vec![
            Message::system(WRITER_SYSTEM),
            Message::user(writer_prompt(&request.parents, instruction)),
        ];
        let response = self.llm.invoke(&messages).await?;
        decode_item(&response.content)
    }

    async fn review(
        &self,
        item: &GeneratedContent,
        request: &GenerationRequest,
    ) -> Result<Option<f64>, GenerateError> {
        let criteria = request
            .criteria
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_CRITERIA);
        let messages = vec![
            Message::system(REVIEWER_SYSTEM),
            Message::user(reviewer_prompt(item, criteria)),
        ];
        let response = self.llm.invoke(&messages).await?;
        let score = decode_score(&response.content);
        if score.is_none() {
            tracing::warn!(reply = %response.content, "review carried no usable score");
        }
        Ok(score)
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerateError> {
        let mut item = self.write(request).await?;
        item.score = self.review(&item, request).await?;
        tracing::debug!(title = %item.title, score = ?item.score, "generated item");
        Ok(item)
    }
}

/// Returns the JSON object text inside `raw`, tolerating code fences and surrounding prose.
fn extract_json_object(raw: &str) -> Option<&str> {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        s = rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest).trim();
    }
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (start < end).then(|| &s[start..=end])
}

#[derive(Deserialize)]
struct RawItem {
    title: Option<String>,
    #[serde(rename = "abstract", alias = "body")]
    body: Option<String>,
}

/// Decodes the writer reply. Missing or blank title/body is an error.
fn decode_item(raw: &str) -> Result<GeneratedContent, GenerateError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| GenerateError::Decode("writer reply has no JSON object".to_string()))?;
    let item: RawItem = serde_json::from_str(json)
        .map_err(|e| GenerateError::Decode(format!("writer reply: {}", e)))?;
    let title = item
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GenerateError::Decode("writer reply has no title".to_string()))?;
    let body = item
        .body
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| GenerateError::Decode("writer reply has no abstract".to_string()))?;
    Ok(GeneratedContent {
        title,
        body,
        score: None,
    })
}

/// Decodes the reviewer reply into a `[0, 1]` score; `None` if unusable.
fn decode_score(raw: &str) -> Option<f64> {
    let json = extract_json_object(raw)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let score = match value.get("score")? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (score.is_finite() && (0.0..=100.0).contains(&score)).then(|| score / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::ParentContent;
    use crate::llm::MockLlm;

    fn request() -> GenerationRequest {
        GenerationRequest {
            parents: vec![ParentContent {
                title: "Parent".into(),
                body: "Parent body".into(),
            }],
            instruction: Some("Write a plot.".into()),
            criteria: Some("Engagement".into()),
        }
    }

    #[test]
    fn extract_handles_fences_and_prose() {
        assert_eq!(extract_json_object("{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(
            extract_json_object("```json\n{\"a\":1}\n```"),
            Some("{\"a\":1}")
        );
        assert_eq!(
            extract_json_object("Sure! {\"a\":1} hope it helps"),
            Some("{\"a\":1}")
        );
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn decode_item_requires_title_and_body() {
        let ok = decode_item(r#"{"title":" T ","abstract":"B"}"#).unwrap();
        assert_eq!(ok.title, "T");
        assert_eq!(ok.body, "B");
        assert!(decode_item(r#"{"title":"T","body":"B"}"#).is_ok());
        assert!(matches!(
            decode_item(r#"{"title":"T"}"#),
            Err(GenerateError::Decode(_))
        ));
        assert!(matches!(
            decode_item(r#"{"title":"","abstract":"B"}"#),
            Err(GenerateError::Decode(_))
        ));
        assert!(matches!(decode_item("plain text"), Err(GenerateError::Decode(_))));
    }

    #[test]
    fn decode_score_normalizes_and_rejects_out_of_range() {
        assert_eq!(decode_score(r#"{"score": 80}"#), Some(0.8));
        assert_eq!(decode_score(r#"{"score": "65"}"#), Some(0.65));
        assert_eq!(decode_score(r#"{"score": 0}"#), Some(0.0));
        assert_eq!(decode_score(r#"{"score": 100}"#), Some(1.0));
        assert_eq!(decode_score(r#"{"score": 120}"#), None);
        assert_eq!(decode_score(r#"{"score": -3}"#), None);
        assert_eq!(decode_score(r#"{"score": "high"}"#), None);
        assert_eq!(decode_score(r#"{"comments": "meh"}"#), None);
        assert_eq!(decode_score("not json"), None);
    }

    /// **Scenario**: Writer then reviewer; score normalized; prompts carry instruction and criteria.
    #[tokio::test]
    async fn generate_writes_then_reviews() {
        let llm = Arc::new(MockLlm::with_replies([
            r#"{"title":"New","abstract":"Fresh"}"#,
            r#"{"comments":"ok","score":72}"#,
        ]));
        let generator = LlmGenerator::new(llm.clone());
        let out = generator.generate(&request()).await.unwrap();
        assert_eq!(out.title, "New");
        assert_eq!(out.body, "Fresh");
        assert_eq!(out.score, Some(0.72));

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0][1].content().contains("Write a plot."));
        assert!(requests[0][1].content().contains("Title: Parent"));
        assert!(requests[1][1].content().contains("Engagement"));
        assert!(requests[1][1].content().contains("Title: New"));
    }

    /// **Scenario**: Unusable review leaves score None instead of failing.
    #[tokio::test]
    async fn unusable_review_yields_no_score() {
        let llm = Arc::new(MockLlm::with_replies([
            r#"{"title":"New","abstract":"Fresh"}"#,
            "I refuse to score this.",
        ]));
        let out = LlmGenerator::new(llm).generate(&request()).await.unwrap();
        assert_eq!(out.score, None);
    }

    /// **Scenario**: Bad writer output fails before any review call.
    #[tokio::test]
    async fn bad_writer_output_fails_without_review() {
        let llm = Arc::new(MockLlm::new("no json"));
        let err = LlmGenerator::new(llm.clone())
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Decode(_)));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn llm_failure_maps_to_llm_error() {
        let llm = Arc::new(MockLlm::failing("network down"));
        let err = LlmGenerator::new(llm).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerateError::Llm(_)));
    }

    #[tokio::test]
    async fn blank_instruction_falls_back_to_default() {
        let llm = Arc::new(MockLlm::paper_writer(50));
        let mut req = request();
        req.instruction = Some("   ".into());
        LlmGenerator::new(llm.clone()).generate(&req).await.unwrap();
        assert!(llm.requests()[0][1].content().contains(DEFAULT_INSTRUCTION));
    }
}
