//! In-memory chat transcript and the data cached from answered calls.

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use super::assistant::Reply;

/// Example questions shown alongside the conversation.
pub const QUICK_TIPS: [&str; 5] = [
    "Show me top 5 holdings",
    "What's the total number of trades?",
    "Compare all funds by market value",
    "Get yearly performance",
    "Show holdings by security type",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: Vec<Message>,
    cache: Map<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(Message {
            role,
            content,
            at: Local::now(),
        });
    }

    /// Append the assistant's reply and cache its data under the call that produced it.
    pub fn record(&mut self, reply: &Reply) {
        self.push_assistant(reply.text.clone());
        if let Some(answer) = &reply.answer {
            self.cache.insert(answer.call.to_string(), answer.data.clone());
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.cache.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn total_messages(&self) -> usize {
        self.messages.len()
    }

    /// Completed question/answer pairs.
    pub fn turns(&self) -> usize {
        self.messages.len() / 2
    }

    /// Cached payloads in the order their calls were first answered.
    pub fn cached(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cache.iter().map(|(k, v)| (k.as_str(), v))
    }
}
