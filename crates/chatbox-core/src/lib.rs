pub mod api;
pub mod config;
pub mod error;
pub mod learn;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::BackendClient;
pub use config::Config;
pub use error::ApiError;
pub use learn::LearnFact;
pub use session::{ChatSession, ChatView, Prompter};
pub use state::{Message, Sender, Transcript};
