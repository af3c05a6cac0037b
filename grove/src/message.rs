//! Chat message types passed to [`LlmClient`](crate::llm::LlmClient).

/// A single chat message.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Self::System(s) | Self::User(s) | Self::Assistant(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_matching_variant() {
        assert!(matches!(Message::system("s"), Message::System(c) if c == "s"));
        assert!(matches!(Message::user("u"), Message::User(c) if c == "u"));
        assert_eq!(Message::assistant("a").content(), "a");
    }
}
