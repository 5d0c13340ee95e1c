use brandkit_core::{KeywordMetric, PageContents, SocialPost};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SitemapResponse {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScreenshotResponse {
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HtmlResponse {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BodyResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BusinessResponse {
    #[serde(default)]
    pub pages: Vec<PageContents>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordVolumeResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeywordMetricsRequest<'a> {
    pub keywords: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordMetricsResponse {
    #[serde(default)]
    pub metrics: Vec<KeywordMetric>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SocialMediaResponse {
    #[serde(default)]
    pub posts: Vec<SocialPost>,
}

/// Search-result count meaning the lookup failed or is unknown.
pub const UNKNOWN_VOLUME: i64 = -1;
