//! HTML templates using Askama.

use askama::Template;

use crate::domain::session::{QUICK_TIPS, Session};

pub struct MessageView {
    pub role: &'static str,
    pub content: String,
    pub time: String,
}

pub struct CachedView {
    pub name: String,
    pub json: String,
}

/// Everything the chat page shows, snapshotted from the session.
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub total_messages: usize,
    pub turns: usize,
    pub cached: Vec<CachedView>,
}

impl ChatView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            messages: session
                .messages()
                .iter()
                .map(|m| MessageView {
                    role: m.role.as_str(),
                    content: m.content.clone(),
                    time: m.at.format("%H:%M").to_string(),
                })
                .collect(),
            total_messages: session.total_messages(),
            turns: session.turns(),
            cached: session
                .cached()
                .map(|(name, value)| CachedView {
                    name: name.to_string(),
                    json: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate<'a> {
    pub available: bool,
    pub setup: &'a str,
    pub tips: &'a [&'a str],
    pub view: &'a ChatView,
}

impl<'a> ChatTemplate<'a> {
    pub fn new(available: bool, setup: &'a str, view: &'a ChatView) -> Self {
        Self {
            available,
            setup,
            tips: &QUICK_TIPS,
            view,
        }
    }
}

/// HTMX reply to a question: the conversation plus an out-of-band sidebar.
#[derive(Template)]
#[template(path = "turn.html")]
pub struct TurnTemplate<'a> {
    pub tips: &'a [&'a str],
    pub view: &'a ChatView,
}

impl<'a> TurnTemplate<'a> {
    pub fn new(view: &'a ChatView) -> Self {
        Self {
            tips: &QUICK_TIPS,
            view,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
