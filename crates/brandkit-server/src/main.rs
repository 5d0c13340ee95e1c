mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use brandkit_autofill::{AutofillClient, DesignService, TokenCache};
use brandkit_campaign::{Orchestrator, OrchestratorParts};
use brandkit_core::{AppConfig, Environment, Template};
use brandkit_llm::{LanguageModel, Models, OpenAiClient};
use brandkit_profiler::Researcher;
use brandkit_scraper::{ScraperClient, WebScraper};
use brandkit_store::{Backend, MemoryBackend, RowStoreBackend, Store};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[derive(Debug, Parser)]
#[command(name = "brandkit-server")]
#[command(about = "Business profiling and campaign rendering API")]
struct Cli {
    /// Bind address such as `:8080` or `127.0.0.1:9000`; overrides `BRANDKIT_LISTEN`.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = brandkit_core::load_app_config_from_env()?;
    if let Some(raw) = cli.listen.as_deref() {
        config.listen_addr = brandkit_core::parse_listen_addr(raw)?;
    }
    let config = Arc::new(config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let tokens = Arc::new(TokenCache::new(
        &config.autofill_token_path,
        &config.autofill_base_url,
        &config.autofill_client_id,
        &config.autofill_client_secret,
        config.autofill_refresh_buffer_secs,
    )?);
    tokens.refresh().await.with_context(|| {
        format!(
            "initial autofill token refresh from {} failed",
            tokens.path().display()
        )
    })?;
    let _scheduler = scheduler::build_scheduler(Arc::clone(&tokens)).await?;

    let state = build_state(&config, tokens).await?;
    let auth = AuthState::new(
        config.api_keys.clone(),
        matches!(config.env, Environment::Development),
    )?;
    let app = build_app(state, auth);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, env = %config.env, "brandkit-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_state(config: &AppConfig, tokens: Arc<TokenCache>) -> anyhow::Result<AppState> {
    let backend = store_backend(config)?;
    let summaries = Store::new(Arc::clone(&backend));
    let sitemaps = Store::new(Arc::clone(&backend));
    let templates: Store<Template> = Store::new(backend);

    let catalogue = brandkit_core::load_templates(&config.templates_path)?;
    templates.store_all(&catalogue.templates).await?;
    tracing::info!(
        path = %config.templates_path.display(),
        templates = catalogue.templates.len(),
        "template catalogue seeded"
    );

    let scraper: Arc<dyn WebScraper> = Arc::new(ScraperClient::new(
        &config.scraper_base_url,
        config.scraper_request_timeout_secs,
    )?);
    let llm: Arc<dyn LanguageModel> = Arc::new(
        OpenAiClient::new(&config.openai_api_key, &config.llm_embedding_model)?
            .with_base_url(&config.openai_base_url),
    );
    let models = Models {
        primary: config.llm_primary_model.clone(),
        cheap: config.llm_cheap_model.clone(),
    };
    let designs: Arc<dyn DesignService> =
        Arc::new(AutofillClient::new(&config.autofill_base_url, tokens)?);

    let researcher = Researcher::new(Arc::clone(&scraper), Arc::clone(&llm), models.clone());
    let orchestrator = Orchestrator::new(
        OrchestratorParts {
            scraper,
            llm,
            designs,
            summaries: summaries.clone(),
            sitemaps: sitemaps.clone(),
            templates,
        },
        models,
        config.keyword_weights,
    );

    Ok(AppState {
        researcher,
        orchestrator,
        summaries,
        sitemaps,
    })
}

/// Remote row store when configured; the in-memory store otherwise, which
/// production refuses.
fn store_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn Backend>> {
    match &config.store {
        Some(store) => {
            tracing::info!(url = %store.url, "using remote row store");
            Ok(Arc::new(RowStoreBackend::new(&store.url, &store.service_key)?))
        }
        None if config.env == Environment::Production => {
            anyhow::bail!("STORE_URL and STORE_SERVICE_KEY are required in production")
        }
        None => {
            tracing::warn!("STORE_URL not set; data is kept in memory and lost on restart");
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
