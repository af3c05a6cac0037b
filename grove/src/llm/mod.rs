//! LLM client abstraction used by [`LlmGenerator`](crate::generate::LlmGenerator).
//!
//! The generator only needs one-shot chat completions: send messages, get the assistant
//! text back. `ChatOpenAI` talks to an OpenAI-compatible API; `MockLlm` replays scripted
//! replies for tests and offline runs.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::message::Message;

/// Token usage for one LLM call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from an LLM completion.
#[derive(Clone, Debug)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage, when the provider reports it.
    pub usage: Option<LlmUsage>,
}

/// LLM client: given messages, returns the assistant reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        (**self).invoke(messages).await
    }
}
