//! Shared building blocks for the brandkit services: async fan-out and
//! cancellation, the error taxonomy, configuration, JSON extraction from
//! model output, and the domain types every pipeline passes around.

pub mod app_config;
pub mod business;
pub mod campaign;
pub mod cancel;
pub mod config;
pub mod error;
pub mod keyword;
pub mod llm_json;
pub mod page;
pub mod tasks;
pub mod template;

pub use app_config::{ApiKeyEntry, AppConfig, Environment, StoreConfig};
pub use business::{BusinessSummary, SitemapUrl};
pub use campaign::CampaignTheme;
pub use cancel::{CancelOnDrop, CancelToken};
pub use config::{build_app_config, load_app_config, load_app_config_from_env, parse_listen_addr};
pub use error::{truncated_body, ConfigError, ErrorKind, TaskError, MAX_ERROR_BODY_BYTES};
pub use keyword::{KeywordMetric, KeywordWeights};
pub use llm_json::{extract_json, parse_json, JsonIslandError, JsonKind};
pub use page::{Headings, PageContents, SocialPost};
pub use template::{
    load_templates, ColorField, Design, ExtractedTemplate, FieldKind, PopulatedColor,
    PopulatedField, Template, TemplateField, TemplateResult, Thumbnail,
};
