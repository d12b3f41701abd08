//! Connects a [`ChatSession`] running on tokio tasks to the UI event loop.
//!
//! Operations never touch `App` directly: they post events, and the loop
//! applies them in arrival order.

use async_trait::async_trait;
use chatbox_core::{ChatSession, ChatView, Message, Prompter};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::tui::{AppEvent, SessionEvent};

pub type Session = ChatSession<ChannelView, ChannelPrompter>;

pub struct ChannelView {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelView {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, event: SessionEvent) {
        if self.tx.send(AppEvent::Session(event)).is_err() {
            warn!("UI loop has shut down, dropping session event");
        }
    }
}

impl ChatView for ChannelView {
    fn append(&self, message: Message) {
        self.post(SessionEvent::Append(message));
    }

    fn clear_input(&self, sent: &str) {
        self.post(SessionEvent::ClearInput(sent.to_string()));
    }
}

pub struct ChannelPrompter {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelPrompter {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Prompter for ChannelPrompter {
    async fn prompt(&self, question: &str) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        let event = SessionEvent::Prompt {
            question: question.to_string(),
            reply,
        };
        self.tx.send(AppEvent::Session(event)).ok()?;

        // A dropped dialog counts as a cancel
        answer.await.ok().flatten()
    }
}
