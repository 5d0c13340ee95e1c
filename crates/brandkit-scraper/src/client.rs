//! HTTP client for the scraping-service cluster.
//!
//! Every endpoint hangs off one base URL and answers with a small JSON
//! envelope; the client unwraps the envelope and maps non-2xx statuses to
//! [`ScraperError::UnexpectedStatus`].

use std::time::Duration;

use async_trait::async_trait;
use brandkit_core::{truncated_body, KeywordMetric, PageContents, SocialPost};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::sitemap::filter_sitemap;
use crate::types::{
    BodyResponse, BusinessResponse, HtmlResponse, KeywordMetricsRequest, KeywordMetricsResponse,
    KeywordVolumeResponse, ScreenshotResponse, SitemapResponse, SocialMediaResponse,
};

/// Operations the pipelines need from the scraping cluster.
#[async_trait]
pub trait WebScraper: Send + Sync {
    /// Page URLs from the site's sitemap, without nested sitemaps or PDFs.
    async fn sitemap(&self, url: &str) -> Result<Vec<String>, ScraperError>;
    /// Rendered screenshot as a `data:image/png;base64,…` URI.
    async fn screenshot(&self, url: &str) -> Result<String, ScraperError>;
    async fn page_html(&self, url: &str) -> Result<String, ScraperError>;
    /// Visible body text of the page.
    async fn page_body(&self, url: &str) -> Result<String, ScraperError>;
    async fn page_contents(&self, url: &str) -> Result<PageContents, ScraperError>;
    /// Structured contents of the pages the business scraper considers key.
    async fn business_pages(&self, url: &str) -> Result<Vec<PageContents>, ScraperError>;
    /// Total search results for `keyword`; `-1` when unknown.
    async fn keyword_volume(&self, keyword: &str) -> Result<i64, ScraperError>;
    async fn keyword_metrics(&self, keywords: &[String])
        -> Result<Vec<KeywordMetric>, ScraperError>;
    async fn social_media(&self, keyword: &str) -> Result<Vec<SocialPost>, ScraperError>;
}

/// Client for the scraping cluster. Use [`ScraperClient::new`] with the
/// cluster's base URL (a wiremock server in tests).
#[derive(Debug, Clone)]
pub struct ScraperClient {
    client: Client,
    base_url: Url,
}

impl ScraperClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandkit/0.1 (site-profiler)")
            .build()?;

        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, name: &str) -> Result<Url, ScraperError> {
        self.base_url
            .join(name)
            .map_err(|e| ScraperError::InvalidUrl {
                url: format!("{}{name}", self.base_url),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        name: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ScraperError> {
        let url = self.endpoint(name)?;
        self.send_json(self.client.get(url.clone()).query(query), &url)
            .await
    }

    /// Sends the request, asserts a 2xx status, and parses the body as `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ScraperError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: truncated_body(&body),
            });
        }
        serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
            context: url.path().to_string(),
            source,
        })
    }
}

#[async_trait]
impl WebScraper for ScraperClient {
    async fn sitemap(&self, url: &str) -> Result<Vec<String>, ScraperError> {
        let resp: SitemapResponse = self.get_json("sitemap", &[("url", url)]).await?;
        let total = resp.urls.len();
        let urls = filter_sitemap(resp.urls);
        tracing::debug!(url, total, kept = urls.len(), "fetched sitemap");
        Ok(urls)
    }

    async fn screenshot(&self, url: &str) -> Result<String, ScraperError> {
        let resp: ScreenshotResponse = self.get_json("screenshot", &[("url", url)]).await?;
        Ok(resp.image)
    }

    async fn page_html(&self, url: &str) -> Result<String, ScraperError> {
        let resp: HtmlResponse = self.get_json("page-html", &[("url", url)]).await?;
        Ok(resp.html)
    }

    async fn page_body(&self, url: &str) -> Result<String, ScraperError> {
        let resp: BodyResponse = self.get_json("page-body", &[("url", url)]).await?;
        Ok(resp.text)
    }

    async fn page_contents(&self, url: &str) -> Result<PageContents, ScraperError> {
        let mut page: PageContents = self.get_json("page-content", &[("url", url)]).await?;
        if page.url.is_empty() {
            page.url = url.to_string();
        }
        Ok(page)
    }

    async fn business_pages(&self, url: &str) -> Result<Vec<PageContents>, ScraperError> {
        let resp: BusinessResponse = self.get_json("business", &[("url", url)]).await?;
        Ok(resp.pages)
    }

    async fn keyword_volume(&self, keyword: &str) -> Result<i64, ScraperError> {
        let resp: KeywordVolumeResponse = self
            .get_json("keyword-volume", &[("keyword", keyword)])
            .await?;
        Ok(resp.count)
    }

    async fn keyword_metrics(
        &self,
        keywords: &[String],
    ) -> Result<Vec<KeywordMetric>, ScraperError> {
        let url = self.endpoint("keyword-metrics")?;
        let request = self
            .client
            .post(url.clone())
            .json(&KeywordMetricsRequest { keywords });
        let resp: KeywordMetricsResponse = self.send_json(request, &url).await?;
        Ok(resp.metrics)
    }

    async fn social_media(&self, keyword: &str) -> Result<Vec<SocialPost>, ScraperError> {
        let resp: SocialMediaResponse = self
            .get_json("social-media", &[("keyword", keyword)])
            .await?;
        Ok(resp.posts)
    }
}
