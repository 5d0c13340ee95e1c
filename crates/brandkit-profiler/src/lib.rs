//! Business profiler: turns a website into a stored `BusinessSummary`.

pub mod error;
pub(crate) mod prompts;
pub mod researcher;

pub use error::ProfilerError;
pub use researcher::{Research, Researcher, MAX_PAGES, PALETTE_SIZE};
