//! Campaign generation: keyword scoring, theme generation and rendering a
//! theme into a populated vendor design.

pub mod error;
pub mod images;
pub mod keywords;
pub mod orchestrator;
pub(crate) mod prompts;
pub mod text_fit;

pub use error::CampaignError;
pub use images::{ImagePicker, PICK_ATTEMPTS};
pub use keywords::{pick_keywords, score_keywords, ScoredKeyword};
pub use orchestrator::{CampaignRender, Orchestrator, OrchestratorParts};
pub use text_fit::{fit_text_fields, truncate_chars};
