//! Language-model adapter: chat, vision and embeddings behind one trait.

pub mod client;
pub mod error;
pub mod model;
pub(crate) mod types;

pub use client::OpenAiClient;
pub use error::LlmError;
pub use model::{LanguageModel, Models};
