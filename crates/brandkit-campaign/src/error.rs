use brandkit_autofill::AutofillError;
use brandkit_core::{ErrorKind, JsonIslandError, TaskError};
use brandkit_llm::LlmError;
use brandkit_scraper::ScraperError;
use brandkit_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("scraper error: {0}")]
    Scraper(#[from] ScraperError),

    #[error("language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("design vendor error: {0}")]
    Autofill(#[from] AutofillError),

    #[error("could not parse {what} from model output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: JsonIslandError,
    },

    #[error("gave up on {what} after {attempts} attempts")]
    ExhaustedRetries { what: String, attempts: u32 },

    #[error("no templates are available")]
    NoTemplates,

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl CampaignError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CampaignError::Scraper(e) => e.kind(),
            CampaignError::Llm(e) => e.kind(),
            CampaignError::Store(e) => e.kind(),
            CampaignError::Autofill(e) => e.kind(),
            CampaignError::Parse { .. } => ErrorKind::ParseFailure,
            CampaignError::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            CampaignError::NoTemplates => ErrorKind::NotFound,
            CampaignError::Task(e) => e.kind(),
        }
    }
}
