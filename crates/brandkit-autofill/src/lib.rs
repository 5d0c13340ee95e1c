//! Template-fill vendor integration: OAuth token cache, polled jobs, asset
//! uploads and template populate.

pub mod client;
pub mod error;
pub mod job;
pub mod swatch;
pub mod token;
pub mod types;

pub use client::{AutofillClient, DesignService};
pub use error::AutofillError;
pub use job::{JobPoller, DEFAULT_POLL_INTERVAL};
pub use token::TokenCache;
pub use types::{Asset, AssetField, JobStatus, PolledJob, TextField, TokenSet};
