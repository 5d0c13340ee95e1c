//! Business profiling pipeline.
//!
//! sitemap → rank and truncate → parallel page scrape → chat summary, with
//! the screenshot palette computed alongside the page scrape.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use brandkit_core::tasks::{join_all, spawn, spawn_list};
use brandkit_core::{parse_json, BusinessSummary, CancelToken, JsonKind, PageContents, SitemapUrl};
use brandkit_llm::{LanguageModel, Models};
use brandkit_scraper::{rank_pages, WebScraper};
use brandkit_store::{Filter, Store};

use crate::error::ProfilerError;
use crate::prompts::{palette_prompt, summary_prompt};

/// Pages scraped per site, nearest to the root first.
pub const MAX_PAGES: usize = 40;
/// Colours kept from the screenshot palette.
pub const PALETTE_SIZE: usize = 5;

/// Output of [`Researcher::research`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Research {
    /// Ranked page URLs that were scraped.
    pub urls: Vec<String>,
    pub summary: BusinessSummary,
    /// Every image URL seen across the scraped pages, first occurrence wins.
    pub image_urls: Vec<String>,
}

#[derive(Clone)]
pub struct Researcher {
    scraper: Arc<dyn WebScraper>,
    llm: Arc<dyn LanguageModel>,
    models: Models,
}

impl Researcher {
    #[must_use]
    pub fn new(scraper: Arc<dyn WebScraper>, llm: Arc<dyn LanguageModel>, models: Models) -> Self {
        Self {
            scraper,
            llm,
            models,
        }
    }

    /// Profile the site rooted at `root`.
    ///
    /// Any failure is fatal: a sitemap error, a single page that cannot be
    /// scraped, the palette, or a summary the model did not return as JSON.
    ///
    /// # Errors
    ///
    /// See [`ProfilerError`].
    pub async fn research(
        &self,
        root: &str,
        cancel: &CancelToken,
    ) -> Result<Research, ProfilerError> {
        // Workers spawned below stop as soon as this call returns early.
        let scope = cancel.child();
        let _abort_on_exit = scope.drop_guard();

        let sitemap = scope
            .run(async { self.scraper.sitemap(root).await.map_err(ProfilerError::from) })
            .await?;
        let mut urls = rank_pages(sitemap, MAX_PAGES);
        if urls.is_empty() {
            tracing::warn!(root, "sitemap has no pages; profiling the root page only");
            urls.push(root.to_string());
        }
        tracing::info!(root, pages = urls.len(), "profiling site");

        let palette = spawn(&scope, {
            let scraper = Arc::clone(&self.scraper);
            let llm = Arc::clone(&self.llm);
            let model = self.models.primary.clone();
            let root = root.to_string();
            async move { extract_palette(scraper.as_ref(), llm.as_ref(), &root, &model).await }
        });

        let profile = async {
            let arrivals = Arc::new(AtomicUsize::new(0));
            let handles = spawn_list(&scope, urls.clone(), |url| {
                let scraper = Arc::clone(&self.scraper);
                let arrivals = Arc::clone(&arrivals);
                async move {
                    let page = scraper.page_contents(&url).await?;
                    Ok::<_, ProfilerError>((arrivals.fetch_add(1, Ordering::Relaxed), page))
                }
            });
            let pages = join_all(handles).await?;

            let image_urls = collect_images(pages.iter().map(|(_, page)| page));
            let site_text = site_text(pages);

            let summary_reply = scope
                .run(async {
                    self.llm
                        .chat(&summary_prompt(&site_text), &self.models.primary)
                        .await
                        .map_err(ProfilerError::from)
                })
                .await?;
            let summary: BusinessSummary = parse_json(&summary_reply, JsonKind::Object)
                .map_err(|source| ProfilerError::Parse {
                    what: "business summary",
                    source,
                })?;
            Ok::<_, ProfilerError>((summary, image_urls))
        };

        // A palette failure abandons the page scrape and the summary request.
        let ((mut summary, image_urls), colors) = tokio::try_join!(profile, palette.join())?;
        summary.colors = colors;

        tracing::info!(
            root,
            name = %summary.name,
            images = image_urls.len(),
            colors = summary.colors.len(),
            "site profiled"
        );
        Ok(Research {
            urls,
            summary,
            image_urls,
        })
    }

    /// Research `root` on behalf of `owner` and persist the result.
    ///
    /// Refuses with [`ProfilerError::Conflict`] before any remote call if the
    /// owner already has a non-empty summary or any sitemap URL.
    ///
    /// # Errors
    ///
    /// [`ProfilerError::Conflict`], or any research or store error.
    pub async fn profile_owner(
        &self,
        owner: &str,
        root: &str,
        summaries: &Store<BusinessSummary>,
        sitemaps: &Store<SitemapUrl>,
        cancel: &CancelToken,
    ) -> Result<BusinessSummary, ProfilerError> {
        if already_profiled(owner, summaries, sitemaps).await? {
            tracing::info!(owner, "refusing to profile: data already exists");
            return Err(ProfilerError::Conflict {
                owner: owner.to_string(),
            });
        }

        let research = self.research(root, cancel).await?;

        let mut summary = research.summary;
        summary.id = owner.to_string();
        summaries.store(&summary).await?;

        let rows: Vec<SitemapUrl> = research
            .urls
            .iter()
            .map(|url| SitemapUrl::new(owner, url.as_str()))
            .collect();
        sitemaps.store_all(&rows).await?;

        tracing::info!(owner, urls = rows.len(), "stored business profile");
        Ok(summary)
    }
}

async fn already_profiled(
    owner: &str,
    summaries: &Store<BusinessSummary>,
    sitemaps: &Store<SitemapUrl>,
) -> Result<bool, ProfilerError> {
    let has_summary = match summaries.get(owner).await {
        Ok(summary) => !summary.is_empty(),
        Err(e) if e.is_not_found() => false,
        Err(e) => return Err(e.into()),
    };
    if has_summary {
        return Ok(true);
    }
    let by_owner = Filter::eq("id", owner);
    let urls = sitemaps.get_random(1, Some(&by_owner)).await?;
    Ok(!urls.is_empty())
}

async fn extract_palette(
    scraper: &dyn WebScraper,
    llm: &dyn LanguageModel,
    root: &str,
    model: &str,
) -> Result<Vec<String>, ProfilerError> {
    let screenshot = scraper.screenshot(root).await?;
    let reply = llm
        .vision(&palette_prompt(PALETTE_SIZE), &[screenshot], model)
        .await?;
    let colors: Vec<String> =
        parse_json(&reply, JsonKind::Array).map_err(|source| ProfilerError::Parse {
            what: "colour palette",
            source,
        })?;
    Ok(colors
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .take(PALETTE_SIZE)
        .collect())
}

fn collect_images<'a>(pages: impl Iterator<Item = &'a PageContents>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for page in pages {
        for url in &page.images {
            if seen.insert(url.as_str()) {
                images.push(url.clone());
            }
        }
    }
    images
}

/// Page texts joined in the order the scrapes finished.
fn site_text(mut pages: Vec<(usize, PageContents)>) -> String {
    pages.sort_by_key(|(arrival, _)| *arrival);
    pages
        .iter()
        .map(|(_, page)| page.to_text())
        .collect::<Vec<_>>()
        .join("\n")
}
