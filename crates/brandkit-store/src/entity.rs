use brandkit_core::{BusinessSummary, SitemapUrl, Template};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type persisted through [`crate::Store`].
///
/// The associated constants are the table registry: each entity names the
/// logical table it lives in and the field that carries its id.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    const ID_FIELD: &'static str = "id";
    /// Field holding a vector for similarity search, if the entity has one.
    const EMBEDDING_FIELD: Option<&'static str> = None;

    /// Storage identity, or `None` when the entity cannot be persisted yet.
    fn key(&self) -> Option<String>;
}

#[must_use]
pub fn table_name<T: Entity>() -> &'static str {
    T::TABLE
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Entity for BusinessSummary {
    const TABLE: &'static str = "business_summaries";

    fn key(&self) -> Option<String> {
        non_empty(&self.id)
    }
}

impl Entity for SitemapUrl {
    const TABLE: &'static str = "sitemap_urls";

    fn key(&self) -> Option<String> {
        Some(format!("{}|{}", non_empty(&self.id)?, non_empty(&self.url)?))
    }
}

impl Entity for Template {
    const TABLE: &'static str = "templates";
    const EMBEDDING_FIELD: Option<&'static str> = Some("embedding");

    fn key(&self) -> Option<String> {
        non_empty(&self.id)
    }
}
