//! Mock LLM for tests and offline runs.
//!
//! Replays a script of replies in order; once the script is exhausted the last reply
//! repeats (or the script wraps around when cycling). Every request is recorded so tests
//! can inspect the prompts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// One scripted reply: assistant text or a failure.
#[derive(Clone, Debug)]
enum Reply {
    Content(String),
    Fail(String),
}

/// Mock LLM: scripted replies, recorded requests.
pub struct MockLlm {
    script: Vec<Reply>,
    /// When true, the script wraps around instead of repeating the last reply.
    cycle: bool,
    call_count: AtomicUsize,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Always returns `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_script(vec![Reply::Content(content.into())])
    }

    /// Returns each reply in turn, then keeps repeating the last one.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(
            replies
                .into_iter()
                .map(|s| Reply::Content(s.into()))
                .collect(),
        )
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(vec![Reply::Fail(message.into())])
    }

    /// Alternates generation and review replies: a paper-shaped JSON object followed by
    /// a review with `score` (0–100). Useful for offline growth runs.
    pub fn paper_writer(score: u32) -> Self {
        Self::with_replies([
            r#"{"title": "Mock idea", "abstract": "A recombination of the given works."}"#
                .to_string(),
            format!(r#"{{"comments": "Adequate.", "score": {}}}"#, score),
        ])
        .cycling()
    }

    fn with_script(script: Vec<Reply>) -> Self {
        Self {
            script,
            cycle: false,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Wraps around to the first reply instead of repeating the last one.
    pub fn cycling(mut self) -> Self {
        self.cycle = true;
        self
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Messages of every request, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, messages: &[Message]) -> usize {
        if let Ok(mut r) = self.requests.lock() {
            r.push(messages.to_vec());
        }
        self.call_count.fetch_add(1, Ordering::SeqCst)
    }

    fn reply_at(&self, index: usize) -> Result<LlmResponse, LlmError> {
        let index = if self.cycle {
            index % self.script.len().max(1)
        } else {
            index
        };
        let reply = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Reply::Content(String::new()));
        match reply {
            Reply::Content(content) => Ok(LlmResponse {
                content,
                usage: None,
            }),
            Reply::Fail(msg) => Err(LlmError::ExecutionFailed(msg)),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let n = self.record(messages);
        self.reply_at(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_repeats_last() {
        let llm = MockLlm::with_replies(["one", "two"]);
        let a = llm.invoke(&[]).await.unwrap();
        let b = llm.invoke(&[]).await.unwrap();
        let c = llm.invoke(&[]).await.unwrap();
        assert_eq!(a.content, "one");
        assert_eq!(b.content, "two");
        assert_eq!(c.content, "two");
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn failing_mock_returns_error() {
        let llm = MockLlm::failing("boom");
        let err = llm.invoke(&[Message::user("x")]).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn paper_writer_cycles_generation_and_review() {
        let llm = MockLlm::paper_writer(80);
        let gen1 = llm.invoke(&[]).await.unwrap();
        let rev1 = llm.invoke(&[]).await.unwrap();
        let gen2 = llm.invoke(&[]).await.unwrap();
        assert!(gen1.content.contains("Mock idea"));
        assert!(rev1.content.contains("80"));
        assert_eq!(gen1.content, gen2.content);
        assert_eq!(llm.calls(), 3);
    }
}
