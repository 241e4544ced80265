use chrono::{DateTime, Utc};

/// Shown in place of an answer when the exchange fails
pub const FAILURE_MESSAGE: &str = "Error fetching response. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            timestamp: Utc::now(),
        }
    }
}

/// Conversation as shown to the reader.
///
/// The reply being streamed is the last message that is not a user message;
/// each arriving fragment is appended to it.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    /// Start an empty assistant message for the reply
    pub fn begin_reply(&mut self) {
        self.messages.push(ChatMessage::assistant(""));
    }

    /// Append to the in-progress reply, opening one if the last message is the user's
    pub fn append_fragment(&mut self, fragment: &str) {
        match self.messages.last_mut() {
            Some(message) if !message.is_user => message.text.push_str(fragment),
            _ => self.messages.push(ChatMessage::assistant(fragment)),
        }
    }

    pub fn push_failure(&mut self) {
        self.messages.push(ChatMessage::assistant(FAILURE_MESSAGE));
    }
}
