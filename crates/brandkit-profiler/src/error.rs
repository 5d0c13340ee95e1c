use brandkit_core::{ErrorKind, JsonIslandError, TaskError};
use brandkit_llm::LlmError;
use brandkit_scraper::ScraperError;
use brandkit_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("owner {owner} already has a business profile or sitemap")]
    Conflict { owner: String },

    #[error("scraper error: {0}")]
    Scraper(#[from] ScraperError),

    #[error("language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("could not parse {what} from model output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: JsonIslandError,
    },

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl ProfilerError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfilerError::Conflict { .. } => ErrorKind::Conflict,
            ProfilerError::Scraper(e) => e.kind(),
            ProfilerError::Llm(e) => e.kind(),
            ProfilerError::Store(e) => e.kind(),
            ProfilerError::Parse { .. } => ErrorKind::ParseFailure,
            ProfilerError::Task(e) => e.kind(),
        }
    }
}
