//! The chat client: turns user intents into backend calls and rendered
//! messages.
//!
//! Every operation is one linear request/response/render sequence. Nothing
//! is shared between operations except the view, so a frontend may run as
//! many of them concurrently as it likes; messages show up in the order the
//! responses complete.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::api::BackendClient;
use crate::learn::LearnFact;
use crate::state::{Message, Sender};

/// Phrase the backend uses when it wants to be taught something
pub const LEARN_TRIGGER: &str = "Should I learn this?";

pub const LEARN_QUESTION: &str = "Enter the information in 'key: value' format:";
pub const WEATHER_QUESTION: &str = "Enter location for weather:";
pub const SEARCH_QUESTION: &str = "Enter what you want to search:";

pub const CHAT_FALLBACK: &str = "Sorry, I couldn't reach the chat service.";
pub const LEARN_FALLBACK: &str = "Sorry, I couldn't learn that new information.";
pub const WEATHER_FALLBACK: &str = "Sorry, I couldn't fetch the weather.";
pub const NEWS_FALLBACK: &str = "Sorry, I couldn't fetch the news.";
pub const SEARCH_FALLBACK: &str = "Sorry, I couldn't perform the search.";
pub const FACTS_FALLBACK: &str = "Sorry, I couldn't fetch what I know.";

/// Where rendered messages go
pub trait ChatView: Send + Sync {
    /// Append one message to the transcript and bring it into view
    fn append(&self, message: Message);

    /// Empty the text input field if it still holds `sent`
    fn clear_input(&self, sent: &str);
}

/// Asks the user for a single line of text. `None` means cancelled.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn prompt(&self, question: &str) -> Option<String>;
}

pub struct ChatSession<V, P> {
    backend: BackendClient,
    view: Arc<V>,
    prompter: Arc<P>,
}

impl<V, P> Clone for ChatSession<V, P> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            view: Arc::clone(&self.view),
            prompter: Arc::clone(&self.prompter),
        }
    }
}

impl<V: ChatView, P: Prompter> ChatSession<V, P> {
    pub fn new(backend: BackendClient, view: Arc<V>, prompter: Arc<P>) -> Self {
        Self {
            backend,
            view,
            prompter,
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Render `message` verbatim under `sender`
    pub fn append_message(&self, message: &str, sender: Sender) {
        self.view.append(Message::new(message, sender));
    }

    fn bot(&self, reply: &str) {
        self.view.append(Message::bot(reply));
    }

    /// Send the current input to `/chat`.
    ///
    /// Blank input is ignored. On success the user's line and the reply are
    /// appended in that order and the input field is cleared. If the reply
    /// asks to be taught, the learning flow runs once.
    pub async fn send_message(&self, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        match self.backend.chat(text).await {
            Ok(response) => {
                self.view.append(Message::user(text));
                self.bot(&response);
                self.view.clear_input(text);

                if response.contains(LEARN_TRIGGER) {
                    self.handle_learning().await;
                }
            }
            Err(e) => {
                // Input is left in place so the user can retry
                error!("Error: chat request failed: {}", e);
                self.bot(CHAT_FALLBACK);
            }
        }
    }

    /// Ask for a `key: value` fact and forward it to [`Self::teach_new_info`]
    pub async fn handle_learning(&self) {
        let Some(input) = self.prompter.prompt(LEARN_QUESTION).await else {
            debug!("learning cancelled");
            return;
        };

        match LearnFact::parse(&input) {
            Some(fact) => self.teach_new_info(&fact.key, &fact.value).await,
            None => debug!("learning input has no ':' separator, ignoring"),
        }
    }

    pub async fn teach_new_info(&self, key: &str, value: &str) {
        let fact = LearnFact {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        };
        if !fact.is_complete() {
            return;
        }

        match self.backend.learn(&fact.key, &fact.value).await {
            Ok(message) => {
                info!("taught fact '{}'", fact.key);
                self.bot(&message);
            }
            Err(e) => {
                error!("Error in learning: {}", e);
                self.bot(LEARN_FALLBACK);
            }
        }
    }

    pub async fn get_weather(&self) {
        let Some(location) = self.ask(WEATHER_QUESTION).await else {
            return;
        };

        match self.backend.weather(&location).await {
            Ok(weather) => {
                debug!("weather for {}: {}", location, weather);
                self.bot(&weather);
            }
            Err(e) => {
                error!("Error in weather API: {}", e);
                self.bot(WEATHER_FALLBACK);
            }
        }
    }

    pub async fn get_news(&self) {
        match self.backend.news().await {
            Ok(news) => self.bot(&news),
            Err(e) => {
                error!("Error in news API: {}", e);
                self.bot(NEWS_FALLBACK);
            }
        }
    }

    pub async fn search_data(&self) {
        let Some(query) = self.ask(SEARCH_QUESTION).await else {
            return;
        };

        match self.backend.search(&query).await {
            Ok(results) => self.bot(&results),
            Err(e) => {
                error!("Error in search API: {}", e);
                self.bot(SEARCH_FALLBACK);
            }
        }
    }

    /// List the facts the backend has learned
    pub async fn show_known_facts(&self) {
        match self.backend.personal_info().await {
            Ok(facts) if facts.is_empty() => self.bot("I don't know anything about you yet."),
            Ok(facts) => {
                let mut reply = String::from("Here is what I know:");
                for (key, value) in &facts {
                    reply.push_str(&format!("\n- {}: {}", key, value));
                }
                self.bot(&reply);
            }
            Err(e) => {
                error!("Error in personal info API: {}", e);
                self.bot(FACTS_FALLBACK);
            }
        }
    }

    /// Prompt, treating cancel and blank answers alike
    async fn ask(&self, question: &str) -> Option<String> {
        let answer = self.prompter.prompt(question).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        }
    }
}
