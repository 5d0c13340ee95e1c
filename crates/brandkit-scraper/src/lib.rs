pub mod client;
pub mod error;
pub mod sitemap;
pub(crate) mod types;

pub use client::{ScraperClient, WebScraper};
pub use error::ScraperError;
pub use sitemap::{dedup_urls, filter_sitemap, path_depth, rank_pages, sort_by_proximity};
pub use types::UNKNOWN_VOLUME;
