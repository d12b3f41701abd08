//! UI-agnostic conversation state
//!
//! These types are shared by every frontend and don't depend on any
//! specific UI framework.

use serde::{Deserialize, Serialize};

/// Who a rendered message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

/// A single rendered line of the conversation.
///
/// `text` is the full visible text, label prefix included, and is always
/// shown verbatim: frontends must never interpret it as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    /// `You: <input>`
    pub fn user(input: &str) -> Self {
        Self::new(format!("{}: {}", Sender::User.label(), input), Sender::User)
    }

    /// `Bot: <reply>`
    pub fn bot(reply: &str) -> Self {
        Self::new(format!("{}: {}", Sender::Bot.label(), reply), Sender::Bot)
    }
}

/// Ordered, append-only list of rendered messages
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
