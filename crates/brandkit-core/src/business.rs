use serde::{Deserialize, Serialize};

/// Structured profile of an owner's business.
///
/// `id` is the owner id; there is at most one summary per owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessSummary {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub summary: String,
    #[serde(default)]
    pub brand_voice: String,
    #[serde(default)]
    pub target_region: String,
    #[serde(default)]
    pub target_audience: String,
    /// Ordered hex palette, most prominent first.
    #[serde(default)]
    pub colors: Vec<String>,
}

impl BusinessSummary {
    /// True when no descriptive field carries any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.summary.trim().is_empty()
            && self.brand_voice.trim().is_empty()
            && self.target_region.trim().is_empty()
            && self.target_audience.trim().is_empty()
            && self.colors.is_empty()
    }
}

/// One page URL discovered while profiling an owner's site.
///
/// `id` holds the owner id; identity is the pair (owner, url).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SitemapUrl {
    pub id: String,
    pub url: String,
}

impl SitemapUrl {
    #[must_use]
    pub fn new(owner: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: owner.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_summary_is_empty() {
        assert!(BusinessSummary::default().is_empty());
    }

    #[test]
    fn summary_with_palette_only_is_not_empty() {
        let summary = BusinessSummary {
            colors: vec!["#112233".into()],
            ..BusinessSummary::default()
        };
        assert!(!summary.is_empty());
    }

    #[test]
    fn llm_shaped_summary_deserialises_without_id_or_colors() {
        let json = r#"{"name":"Acme","summary":"Widgets","brand_voice":"warm"}"#;
        let summary: BusinessSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.name, "Acme");
        assert!(summary.id.is_empty());
        assert!(summary.colors.is_empty());
    }
}
