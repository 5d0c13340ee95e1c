use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use brandkit_autofill::{AssetField, AutofillError, DesignService, TextField};
use brandkit_campaign::OrchestratorParts;
use brandkit_core::{
    ApiKeyEntry, CancelToken, KeywordMetric, KeywordWeights, PageContents, SocialPost,
    TemplateResult,
};
use brandkit_llm::{LanguageModel, LlmError, Models};
use brandkit_scraper::{ScraperError, WebScraper};
use brandkit_store::{Backend, MemoryBackend};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;

const OWNER: &str = "owner-1";

#[derive(Default)]
struct SiteScraper {
    calls: AtomicUsize,
}

#[async_trait]
impl WebScraper for SiteScraper {
    async fn sitemap(&self, _url: &str) -> Result<Vec<String>, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            "https://bakery.test/menu".to_string(),
            "https://bakery.test/".to_string(),
        ])
    }

    async fn screenshot(&self, _url: &str) -> Result<String, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("data:image/png;base64,AAAA".to_string())
    }

    async fn page_html(&self, _url: &str) -> Result<String, ScraperError> {
        Ok(String::new())
    }

    async fn page_body(&self, _url: &str) -> Result<String, ScraperError> {
        Ok(String::new())
    }

    async fn page_contents(&self, url: &str) -> Result<PageContents, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PageContents {
            url: url.to_string(),
            title: "Crumb & Co".to_string(),
            ..PageContents::default()
        })
    }

    async fn business_pages(&self, _url: &str) -> Result<Vec<PageContents>, ScraperError> {
        Ok(Vec::new())
    }

    async fn keyword_volume(&self, _keyword: &str) -> Result<i64, ScraperError> {
        Ok(-1)
    }

    async fn keyword_metrics(
        &self,
        _keywords: &[String],
    ) -> Result<Vec<KeywordMetric>, ScraperError> {
        Ok(Vec::new())
    }

    async fn social_media(&self, _keyword: &str) -> Result<Vec<SocialPost>, ScraperError> {
        Ok(Vec::new())
    }
}

struct SiteModel;

#[async_trait]
impl LanguageModel for SiteModel {
    async fn chat(&self, prompt: &str, _model: &str) -> Result<String, LlmError> {
        let reply = if prompt.contains("marketing strategist") {
            json!([{"theme": "Spring bake sale", "keywords": ["sourdough"],
                    "url": "https://bakery.test/menu"}])
        } else {
            json!({"name": "Crumb & Co", "summary": "Neighbourhood sourdough bakery",
                   "brand_voice": "warm"})
        };
        Ok(reply.to_string())
    }

    async fn vision(
        &self,
        _prompt: &str,
        _images: &[String],
        _model: &str,
    ) -> Result<String, LlmError> {
        Ok(r##"["#112233", "#ffeedd"]"##.to_string())
    }

    async fn embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|_| vec![0.0]).collect())
    }
}

struct NoDesigns;

#[async_trait]
impl DesignService for NoDesigns {
    async fn upload_image_assets(
        &self,
        _references: &[String],
        _cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        Ok(Vec::new())
    }

    async fn upload_color_assets(
        &self,
        _hexes: &[String],
        _cancel: &CancelToken,
    ) -> Result<Vec<String>, AutofillError> {
        Ok(Vec::new())
    }

    async fn populate_template(
        &self,
        _template_id: &str,
        _images: &[AssetField],
        _texts: &[TextField],
        _colors: &[AssetField],
        _cancel: &CancelToken,
    ) -> Result<TemplateResult, AutofillError> {
        Err(AutofillError::JobFailed {
            id: "J1".to_string(),
            message: "no designs in tests".to_string(),
        })
    }
}

struct Harness {
    state: AppState,
    scraper: Arc<SiteScraper>,
}

fn harness() -> Harness {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
    let scraper = Arc::new(SiteScraper::default());
    let web: Arc<dyn WebScraper> = scraper.clone();
    let llm: Arc<dyn LanguageModel> = Arc::new(SiteModel);
    let designs: Arc<dyn DesignService> = Arc::new(NoDesigns);
    let summaries = Store::new(Arc::clone(&backend));
    let sitemaps = Store::new(Arc::clone(&backend));

    let state = AppState {
        researcher: Researcher::new(Arc::clone(&web), Arc::clone(&llm), Models::default()),
        orchestrator: Orchestrator::new(
            OrchestratorParts {
                scraper: web,
                llm,
                designs,
                summaries: summaries.clone(),
                sitemaps: sitemaps.clone(),
                templates: Store::new(backend),
            },
            Models::default(),
            KeywordWeights::default(),
        ),
        summaries,
        sitemaps,
    };
    Harness { state, scraper }
}

fn dev_app(state: AppState) -> Router {
    build_app(state, AuthState::new(Vec::new(), true).expect("auth"))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(OWNER_HEADER, OWNER);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(req).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn seed_summary(state: &AppState) {
    state
        .summaries
        .store(&BusinessSummary {
            id: OWNER.to_string(),
            name: "Crumb & Co".to_string(),
            summary: "Bakery".to_string(),
            ..BusinessSummary::default()
        })
        .await
        .expect("seed summary");
}

#[test]
fn error_kinds_map_to_statuses() {
    assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(ErrorKind::Conflict), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
    for kind in [
        ErrorKind::Unauthorized,
        ErrorKind::UpstreamFailure,
        ErrorKind::RemoteJobFailed,
        ErrorKind::ParseFailure,
        ErrorKind::Cancelled,
        ErrorKind::Internal,
    ] {
        assert_eq!(status_for(kind), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn health_is_public() {
    let auth = AuthState::new(
        vec![ApiKeyEntry {
            key: "secret".to_string(),
            owner: OWNER.to_string(),
        }],
        false,
    )
    .expect("auth");
    let app = build_app(harness().state, auth);

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn bearer_key_selects_the_owner() {
    let h = harness();
    seed_summary(&h.state).await;
    let auth = AuthState::new(
        vec![ApiKeyEntry {
            key: "secret".to_string(),
            owner: OWNER.to_string(),
        }],
        false,
    )
    .expect("auth");
    let app = build_app(h.state, auth);

    let (status, _) = send(
        app.clone(),
        Request::builder()
            .uri("/business-summaries")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/business-summaries")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Crumb & Co"));
}

#[tokio::test]
async fn missing_owner_is_an_internal_error() {
    let app = dev_app(harness().state);
    let (status, _) = send(
        app,
        Request::builder()
            .uri("/business-summaries")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_summary_is_not_found() {
    let app = dev_app(harness().state);
    let (status, body) = send(app, request("GET", "/business-summaries", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains(OWNER));
}

#[tokio::test]
async fn profiling_stores_summary_and_sitemap() {
    let h = harness();
    let app = dev_app(h.state.clone());

    let (status, body) = send(
        app.clone(),
        request(
            "POST",
            "/business-summaries",
            Some(json!({"url": "https://bakery.test"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let summary: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(summary["id"], OWNER);
    assert_eq!(summary["name"], "Crumb & Co");
    assert_eq!(summary["colors"], json!(["#112233", "#ffeedd"]));

    let (status, body) = send(app, request("GET", "/sitemap", None)).await;
    assert_eq!(status, StatusCode::OK);
    let sitemap: Value = serde_json::from_str(&body).expect("json");
    let mut urls: Vec<String> = serde_json::from_value(sitemap["urls"].clone()).expect("urls");
    urls.sort();
    assert_eq!(urls, ["https://bakery.test/", "https://bakery.test/menu"]);
}

#[tokio::test]
async fn profiling_twice_is_rejected_without_scraping() {
    let h = harness();
    seed_summary(&h.state).await;
    let app = dev_app(h.state.clone());

    let (status, _) = send(
        app,
        request(
            "POST",
            "/business-summaries",
            Some(json!({"url": "https://bakery.test"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.scraper.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn profiling_rejects_bad_urls() {
    let h = harness();
    let app = dev_app(h.state.clone());

    for body in [json!({}), json!({"url": "not a url"}), json!({"url": "ftp://bakery.test"})] {
        let (status, _) = send(
            app.clone(),
            request("POST", "/business-summaries", Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let malformed = Request::builder()
        .method("POST")
        .uri("/business-summaries")
        .header(OWNER_HEADER, OWNER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let (status, _) = send(app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.scraper.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn summary_accepts_partial_updates() {
    let h = harness();
    seed_summary(&h.state).await;
    let app = dev_app(h.state.clone());

    let (status, body) = send(
        app.clone(),
        request(
            "PATCH",
            "/business-summaries",
            Some(json!({"brand_voice": "playful"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let updated: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(updated["brand_voice"], "playful");
    assert_eq!(updated["name"], "Crumb & Co");

    let stored = h.state.summaries.get(OWNER).await.expect("stored");
    assert_eq!(stored.brand_voice, "playful");

    let (status, _) = send(
        app,
        request("PATCH", "/business-summaries", Some(json!({"nonsense": 1}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn themes_are_generated_for_the_owner() {
    let h = harness();
    seed_summary(&h.state).await;
    let app = dev_app(h.state.clone());

    let (status, body) = send(app, request("GET", "/campaigns/themes", None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let themes: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(themes[0]["theme"], "Spring bake sale");
    assert_eq!(themes[0]["primaryKeyword"], "");
}

#[tokio::test]
async fn campaign_render_validates_its_input() {
    let h = harness();
    let app = dev_app(h.state.clone());

    let (status, _) = send(app.clone(), request("POST", "/campaigns", Some(json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let theme = json!({"theme": {"theme": "Spring", "url": "https://bakery.test/menu"}});
    let (status, _) = send(app, request("POST", "/campaigns", Some(theme))).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "no summary for the owner yet");
}
