//! Client for the template-fill vendor: asset uploads and template populate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use brandkit_core::tasks::{join_all, spawn_list};
use brandkit_core::{truncated_body, CancelToken, TemplateResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::AutofillError;
use crate::job::JobPoller;
use crate::swatch::solid_png;
use crate::token::TokenCache;
use crate::types::{Asset, AssetField, AutofillRequest, DataEntry, TextField};

const ASSET_UPLOADS: &str = "asset-uploads";
const AUTOFILLS: &str = "autofills";

/// Rendering operations the campaign pipeline needs from the vendor.
#[async_trait]
pub trait DesignService: Send + Sync {
    /// Upload each image (a `data:` URI or an http(s) URL) and return the
    /// asset ids in input order.
    async fn upload_image_assets(
        &self,
        references: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError>;

    /// Upload a solid swatch per hex colour; asset ids in input order.
    async fn upload_color_assets(
        &self,
        hexes: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError>;

    async fn populate_template(
        &self,
        template_id: &str,
        images: &[AssetField],
        texts: &[TextField],
        colors: &[AssetField],
        cancel: &CancelToken,
    ) -> Result<TemplateResult, AutofillError>;
}

/// Vendor client. Cheap to clone; clones share the token cache.
#[derive(Clone)]
pub struct AutofillClient {
    http: Client,
    base_url: String,
    poller: JobPoller,
}

impl AutofillClient {
    /// # Errors
    ///
    /// Returns [`AutofillError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, tokens: Arc<TokenCache>) -> Result<Self, AutofillError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let poller = JobPoller::new(http.clone(), &base_url, tokens);
        Ok(Self {
            http,
            base_url,
            poller,
        })
    }

    /// Override the delay between job polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenCache> {
        self.poller.tokens()
    }

    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<String, AutofillError> {
        let name = Uuid::new_v4().simple().to_string();
        let metadata = json!({ "name_base64": STANDARD.encode(&name) }).to_string();
        let size = bytes.len();
        let request = self
            .http
            .post(format!("{}/{ASSET_UPLOADS}", self.base_url))
            .header("Asset-Upload-Metadata", metadata)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        let asset: Asset = self
            .poller
            .submit_and_wait(ASSET_UPLOADS, request, cancel)
            .await?;
        tracing::debug!(asset = %asset.id, %name, size, "uploaded asset");
        Ok(asset.id)
    }

    /// Raw bytes behind an image reference.
    async fn load_reference(&self, reference: &str) -> Result<Vec<u8>, AutofillError> {
        let invalid = |reason: &str| AutofillError::InvalidReference {
            reference: reference.chars().take(64).collect(),
            reason: reason.to_string(),
        };

        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| invalid("data URI has no ',' separator"))?;
            if !meta.ends_with(";base64") {
                return Err(invalid("only base64 data URIs are supported"));
            }
            return STANDARD
                .decode(payload.trim())
                .map_err(|e| invalid(&e.to_string()));
        }

        if !(reference.starts_with("http://") || reference.starts_with("https://")) {
            return Err(invalid("expected a data: URI or an http(s) URL"));
        }
        let response = self.http.get(reference).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutofillError::UnexpectedStatus {
                status: status.as_u16(),
                url: reference.to_string(),
                body: truncated_body(&body),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DesignService for AutofillClient {
    async fn upload_image_assets(
        &self,
        references: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        let handles = spawn_list(cancel, references.to_vec(), |reference| {
            let client = self.clone();
            let cancel = cancel.clone();
            async move {
                let bytes = client.load_reference(&reference).await?;
                client.upload_bytes(bytes, &cancel).await
            }
        });
        join_all(handles).await
    }

    async fn upload_color_assets(
        &self,
        hexes: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        // Encode everything first so a bad colour fails before any upload.
        let swatches = hexes
            .iter()
            .map(|hex| solid_png(hex))
            .collect::<Result<Vec<_>, _>>()?;
        let handles = spawn_list(cancel, swatches, |png| {
            let client = self.clone();
            let cancel = cancel.clone();
            async move { client.upload_bytes(png, &cancel).await }
        });
        join_all(handles).await
    }

    async fn populate_template(
        &self,
        template_id: &str,
        images: &[AssetField],
        texts: &[TextField],
        colors: &[AssetField],
        cancel: &CancelToken,
    ) -> Result<TemplateResult, AutofillError> {
        let mut data = Map::new();
        for field in images.iter().chain(colors) {
            data.insert(field.name.clone(), entry(DataEntry::Image {
                asset_id: &field.asset_id,
            })?);
        }
        for field in texts {
            data.insert(field.name.clone(), entry(DataEntry::Text { text: &field.text })?);
        }

        let body = AutofillRequest {
            brand_template_id: template_id,
            data,
        };
        let request = self
            .http
            .post(format!("{}/{AUTOFILLS}", self.base_url))
            .json(&body);

        tracing::info!(
            template = template_id,
            images = images.len(),
            texts = texts.len(),
            colors = colors.len(),
            "populating template"
        );
        self.poller.submit_and_wait(AUTOFILLS, request, cancel).await
    }
}

fn entry(value: DataEntry<'_>) -> Result<Value, AutofillError> {
    serde_json::to_value(value).map_err(|source| AutofillError::Deserialize {
        context: "autofill data entry".to_string(),
        source,
    })
}
