//! In-process fakes for the campaign pipelines.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use brandkit_autofill::{AssetField, AutofillError, DesignService, TextField};
use brandkit_core::{
    CancelToken, Design, KeywordMetric, PageContents, SocialPost, TemplateResult,
};
use brandkit_llm::{LanguageModel, LlmError};
use brandkit_scraper::{ScraperError, WebScraper};

pub type ChatFn = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;
/// Returns `(delay in ms, reply)`.
pub type VisionFn = Box<dyn Fn(&str, &[String]) -> (u64, String) + Send + Sync>;

pub struct ScriptedModel {
    chat: ChatFn,
    vision: VisionFn,
    pub chat_prompts: Mutex<Vec<String>>,
    pub vision_calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(chat: ChatFn, vision: VisionFn) -> Self {
        Self {
            chat,
            vision,
            chat_prompts: Mutex::new(Vec::new()),
            vision_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn chat_count(&self, needle: &str) -> usize {
        self.chat_prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(&self, prompt: &str, _model: &str) -> Result<String, LlmError> {
        self.chat_prompts.lock().unwrap().push(prompt.to_string());
        (self.chat)(prompt)
    }

    async fn vision(
        &self,
        prompt: &str,
        images: &[String],
        _model: &str,
    ) -> Result<String, LlmError> {
        self.vision_calls.lock().unwrap().push(images.to_vec());
        let (delay, reply) = (self.vision)(prompt, images);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(reply)
    }

    async fn embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|_| vec![0.0]).collect())
    }
}

/// Vision reply naming the first label the prompt offers.
pub fn first_offered_label(prompt: &str) -> String {
    let marker = "carry the labels ";
    let start = prompt.find(marker).map_or(0, |i| i + marker.len());
    prompt[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect()
}

#[derive(Default)]
pub struct FakeScraper {
    pub images: Vec<String>,
    pub metrics: Vec<KeywordMetric>,
    pub volumes: HashMap<String, i64>,
    pub posts: Vec<SocialPost>,
    pub page_requests: AtomicUsize,
}

#[async_trait]
impl WebScraper for FakeScraper {
    async fn sitemap(&self, _url: &str) -> Result<Vec<String>, ScraperError> {
        Ok(Vec::new())
    }

    async fn screenshot(&self, _url: &str) -> Result<String, ScraperError> {
        Ok(String::new())
    }

    async fn page_html(&self, _url: &str) -> Result<String, ScraperError> {
        Ok(String::new())
    }

    async fn page_body(&self, url: &str) -> Result<String, ScraperError> {
        Ok(format!("Body of {url}: fresh sourdough baked every morning."))
    }

    async fn page_contents(&self, url: &str) -> Result<PageContents, ScraperError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        Ok(PageContents {
            url: url.to_string(),
            title: format!("Page {url}"),
            images: self.images.clone(),
            ..PageContents::default()
        })
    }

    async fn business_pages(&self, _url: &str) -> Result<Vec<PageContents>, ScraperError> {
        Ok(Vec::new())
    }

    async fn keyword_volume(&self, keyword: &str) -> Result<i64, ScraperError> {
        Ok(self.volumes.get(keyword).copied().unwrap_or(-1))
    }

    async fn keyword_metrics(
        &self,
        keywords: &[String],
    ) -> Result<Vec<KeywordMetric>, ScraperError> {
        Ok(self
            .metrics
            .iter()
            .filter(|m| keywords.contains(&m.keyword))
            .cloned()
            .collect())
    }

    async fn social_media(&self, keyword: &str) -> Result<Vec<SocialPost>, ScraperError> {
        Ok(self
            .posts
            .iter()
            .cloned()
            .map(|mut p| {
                p.text = format!("{} #{keyword}", p.text);
                p
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateCall {
    pub template_id: String,
    pub images: Vec<AssetField>,
    pub texts: Vec<TextField>,
    pub colors: Vec<AssetField>,
}

#[derive(Default)]
pub struct FakeDesigns {
    pub fail_populate: bool,
    pub uploaded_images: Mutex<Vec<String>>,
    pub uploaded_colors: Mutex<Vec<String>>,
    pub populate_calls: Mutex<Vec<PopulateCall>>,
}

#[async_trait]
impl DesignService for FakeDesigns {
    async fn upload_image_assets(
        &self,
        references: &[String],
        _cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        self.uploaded_images
            .lock()
            .unwrap()
            .extend(references.iter().cloned());
        Ok(references.iter().map(|r| format!("asset:{r}")).collect())
    }

    async fn upload_color_assets(
        &self,
        hexes: &[String],
        _cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        self.uploaded_colors
            .lock()
            .unwrap()
            .extend(hexes.iter().cloned());
        Ok(hexes.iter().map(|h| format!("swatch:{h}")).collect())
    }

    async fn populate_template(
        &self,
        template_id: &str,
        images: &[AssetField],
        texts: &[TextField],
        colors: &[AssetField],
        _cancel: &CancelToken,
    ) -> Result<TemplateResult, AutofillError> {
        self.populate_calls.lock().unwrap().push(PopulateCall {
            template_id: template_id.to_string(),
            images: images.to_vec(),
            texts: texts.to_vec(),
            colors: colors.to_vec(),
        });
        if self.fail_populate {
            return Err(AutofillError::JobFailed {
                id: "J1".to_string(),
                message: "template rejected".to_string(),
            });
        }
        Ok(TemplateResult {
            design: Design {
                id: "D1".to_string(),
                title: Some("Rendered".to_string()),
                url: Some("https://vendor.test/D1".to_string()),
                thumbnail: None,
            },
        })
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
