//! LLM call error type.
//!
//! Returned by [`LlmClient::invoke`](crate::llm::LlmClient::invoke). Store, selector and
//! growth errors live next to the code that raises them.

use thiserror::Error;

/// LLM call failure (transport, API, or empty response).
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn llm_error_display_execution_failed() {
        let err = LlmError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("msg"), "{}", s);
    }
}
