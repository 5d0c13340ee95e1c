//! Campaign pipelines: theme generation and rendering a theme into a design.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use brandkit_autofill::{AssetField, DesignService};
use brandkit_core::tasks::{join_all, retry, spawn, spawn_list};
use brandkit_core::{
    parse_json, BusinessSummary, CampaignTheme, CancelToken, Design, ExtractedTemplate, FieldKind,
    JsonKind, KeywordWeights, PageContents, SitemapUrl, Template,
};
use brandkit_llm::{LanguageModel, Models};
use brandkit_scraper::WebScraper;
use brandkit_store::{Filter, Store};
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;
use crate::images::ImagePicker;
use crate::keywords::pick_keywords;
use crate::prompts::{plan_prompt, report_prompt, theme_prompt};
use crate::text_fit::fit_text_fields;

/// Sitemap pages sampled as context for theme generation.
pub const THEME_SAMPLE_PAGES: usize = 5;
pub const THEME_ATTEMPTS: u32 = 3;

/// A rendered campaign: the populated design plus its supporting copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRender {
    pub design: Design,
    pub research_report: String,
    pub caption: String,
    pub platform: String,
}

#[derive(Clone)]
pub struct Orchestrator {
    scraper: Arc<dyn WebScraper>,
    llm: Arc<dyn LanguageModel>,
    designs: Arc<dyn DesignService>,
    summaries: Store<BusinessSummary>,
    sitemaps: Store<SitemapUrl>,
    templates: Store<Template>,
    models: Models,
    weights: KeywordWeights,
}

/// Remote collaborators and stores the orchestrator drives.
pub struct OrchestratorParts {
    pub scraper: Arc<dyn WebScraper>,
    pub llm: Arc<dyn LanguageModel>,
    pub designs: Arc<dyn DesignService>,
    pub summaries: Store<BusinessSummary>,
    pub sitemaps: Store<SitemapUrl>,
    pub templates: Store<Template>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(parts: OrchestratorParts, models: Models, weights: KeywordWeights) -> Self {
        Self {
            scraper: parts.scraper,
            llm: parts.llm,
            designs: parts.designs,
            summaries: parts.summaries,
            sitemaps: parts.sitemaps,
            templates: parts.templates,
            models,
            weights,
        }
    }

    /// Propose campaign themes for `owner`, each carrying its scored
    /// primary and secondary keywords.
    ///
    /// # Errors
    ///
    /// [`CampaignError::Store`] with not-found when the owner has no
    /// summary; scraper, model and parse errors otherwise.
    pub async fn generate_themes(
        &self,
        owner: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<CampaignTheme>, CampaignError> {
        let scope = cancel.child();
        let _abort_on_exit = scope.drop_guard();

        let summary = self.summaries.get(owner).await?;
        let by_owner = Filter::eq("id", owner);
        let sample = self
            .sitemaps
            .get_random(THEME_SAMPLE_PAGES, Some(&by_owner))
            .await?;
        tracing::info!(owner, pages = sample.len(), "generating campaign themes");

        let handles = spawn_list(&scope, sample, |row| {
            let scraper = Arc::clone(&self.scraper);
            async move { Ok::<_, CampaignError>(scraper.page_contents(&row.url).await?) }
        });
        let pages: Vec<PageContents> = join_all(handles).await?;

        let prompt = theme_prompt(&summary, &pages);
        let (llm, model, prompt) = (&self.llm, &self.models.cheap, &prompt);
        let themes: Vec<CampaignTheme> = scope
            .run(retry(THEME_ATTEMPTS, || async move {
                let reply = llm.chat(prompt, model).await?;
                parse_json(&reply, JsonKind::Array).map_err(|source| CampaignError::Parse {
                    what: "campaign themes",
                    source,
                })
            }))
            .await?;

        let handles = spawn_list(&scope, themes, |theme| {
            let scraper = Arc::clone(&self.scraper);
            let weights = self.weights;
            let scope = scope.clone();
            async move { score_theme(scraper, theme, weights, &scope).await }
        });
        let themes = join_all(handles).await?;
        tracing::info!(owner, themes = themes.len(), "campaign themes ready");
        Ok(themes)
    }

    /// Render `theme` into a populated design for the business in `summary`.
    ///
    /// The research report is produced alongside the design. Any failing
    /// step cancels the others and no partial result is returned.
    ///
    /// # Errors
    ///
    /// [`CampaignError::NoTemplates`] when the template store is empty, or
    /// the first error of any step.
    pub async fn render_campaign(
        &self,
        theme: &CampaignTheme,
        summary: &BusinessSummary,
        cancel: &CancelToken,
    ) -> Result<CampaignRender, CampaignError> {
        let scope = cancel.child();
        let _abort_on_exit = scope.drop_guard();
        tracing::info!(theme = %theme.theme, url = %theme.url, "rendering campaign");

        let body = spawn(&scope, {
            let scraper = Arc::clone(&self.scraper);
            let url = theme.url.clone();
            async move { Ok::<_, CampaignError>(scraper.page_body(&url).await?) }
        });
        let contents = spawn(&scope, {
            let scraper = Arc::clone(&self.scraper);
            let url = theme.url.clone();
            async move { Ok::<_, CampaignError>(scraper.page_contents(&url).await?) }
        });
        let report = spawn(&scope, {
            let scraper = Arc::clone(&self.scraper);
            let llm = Arc::clone(&self.llm);
            let model = self.models.primary.clone();
            let theme = theme.clone();
            async move {
                let posts = scraper.social_media(&theme.primary_keyword).await?;
                Ok::<_, CampaignError>(llm.chat(&report_prompt(&theme, &posts), &model).await?)
            }
        });

        let design = async {
            let template = self
                .templates
                .get_random(1, None)
                .await?
                .into_iter()
                .next()
                .ok_or(CampaignError::NoTemplates)?;

            let body = body.join().await?;
            let reply = scope
                .run(async {
                    self.llm
                        .chat(
                            &plan_prompt(summary, theme, &template, &body),
                            &self.models.primary,
                        )
                        .await
                        .map_err(CampaignError::from)
                })
                .await?;
            let plan: ExtractedTemplate =
                parse_json(&reply, JsonKind::Object).map_err(|source| CampaignError::Parse {
                    what: "template plan",
                    source,
                })?;
            tracing::debug!(
                template = %template.id,
                fields = plan.fields.len(),
                colors = plan.color_fields.len(),
                "template planned"
            );

            let image_slots = image_slots(&template, &plan);
            let images = spawn(&scope, {
                let picker = ImagePicker::new(Arc::clone(&self.llm), self.models.clone());
                let designs = Arc::clone(&self.designs);
                let campaign = format!("{}: {}", theme.theme, theme.image_template_description);
                let scope = scope.clone();
                async move {
                    if image_slots.is_empty() {
                        return Ok(Vec::new());
                    }
                    let page = contents.join().await?;
                    let candidates = unique(page.images);
                    let descriptions: Vec<String> =
                        image_slots.iter().map(|(_, desc)| desc.clone()).collect();
                    let picks = picker
                        .pick(&descriptions, &candidates, &campaign, &scope)
                        .await?;
                    let ids = designs.upload_image_assets(&picks, &scope).await?;
                    Ok::<_, CampaignError>(asset_fields(
                        image_slots.into_iter().map(|(n, _)| n),
                        ids,
                    ))
                }
            });

            let color_slots = color_slots(&template, &plan);
            let colors = spawn(&scope, {
                let designs = Arc::clone(&self.designs);
                let scope = scope.clone();
                async move {
                    if color_slots.is_empty() {
                        return Ok(Vec::new());
                    }
                    let hexes: Vec<String> =
                        color_slots.iter().map(|(_, hex)| hex.clone()).collect();
                    let ids = designs.upload_color_assets(&hexes, &scope).await?;
                    Ok::<_, CampaignError>(asset_fields(
                        color_slots.into_iter().map(|(n, _)| n),
                        ids,
                    ))
                }
            });

            let (texts, images, colors) = tokio::try_join!(
                fit_text_fields(
                    &self.llm,
                    &self.models.primary,
                    &template,
                    &plan.fields,
                    &scope,
                ),
                images.join(),
                colors.join(),
            )?;

            let result = self
                .designs
                .populate_template(&template.id, &images, &texts, &colors, &scope)
                .await?;
            Ok::<_, CampaignError>((template, plan, result))
        };

        // The first failure on either side drops the other, and the guard
        // above then stops every worker still attached to `scope`.
        let ((template, plan, result), research_report) =
            tokio::try_join!(design, report.join())?;

        tracing::info!(
            theme = %theme.theme,
            template = %template.id,
            design = %result.design.id,
            "campaign rendered"
        );
        Ok(CampaignRender {
            design: result.design,
            research_report,
            caption: plan.caption,
            platform: plan.platform,
        })
    }
}

async fn score_theme(
    scraper: Arc<dyn WebScraper>,
    mut theme: CampaignTheme,
    weights: KeywordWeights,
    cancel: &CancelToken,
) -> Result<CampaignTheme, CampaignError> {
    let metrics = scraper.keyword_metrics(&theme.keywords).await?;
    let handles = spawn_list(cancel, theme.keywords.clone(), |keyword| {
        let scraper = Arc::clone(&scraper);
        async move {
            let count = scraper.keyword_volume(&keyword).await?;
            Ok::<_, CampaignError>((keyword, count))
        }
    });
    let counts: HashMap<String, i64> = join_all(handles).await?.into_iter().collect();

    let (primary, secondary) = pick_keywords(&metrics, &counts, &weights);
    tracing::debug!(theme = %theme.theme, %primary, %secondary, "scored theme keywords");
    theme.primary_keyword = primary;
    theme.secondary_keyword = secondary;
    Ok(theme)
}

/// `(field name, picture description)` for planned image fields the
/// template actually has.
fn image_slots(template: &Template, plan: &ExtractedTemplate) -> Vec<(String, String)> {
    plan.fields
        .iter()
        .filter(|f| f.kind == FieldKind::Image)
        .filter_map(|f| match template.field(&f.name) {
            Some(slot) if slot.kind == FieldKind::Image => Some((f.name.clone(), f.value.clone())),
            _ => {
                tracing::warn!(template = %template.id, field = %f.name, "dropping unknown image field");
                None
            }
        })
        .collect()
}

/// `(field name, hex)` for planned colours the template actually has.
fn color_slots(template: &Template, plan: &ExtractedTemplate) -> Vec<(String, String)> {
    plan.color_fields
        .iter()
        .filter_map(|c| {
            if template.color_fields.iter().any(|slot| slot.name == c.name) {
                Some((c.name.clone(), c.hex.clone()))
            } else {
                tracing::warn!(template = %template.id, field = %c.name, "dropping unknown colour field");
                None
            }
        })
        .collect()
}

fn asset_fields(names: impl Iterator<Item = String>, ids: Vec<String>) -> Vec<AssetField> {
    names
        .zip(ids)
        .map(|(name, asset_id)| AssetField { name, asset_id })
        .collect()
}

fn unique(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
