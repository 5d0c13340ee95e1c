//! Vision-driven image selection for template image slots.
//!
//! Slots are resolved in parallel against one candidate pool. A URL may be
//! claimed by at most one slot per call; the claim set lives behind a mutex
//! that every slot takes before registering its pick.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use brandkit_core::tasks::{join_all, spawn_list};
use brandkit_core::{parse_json, CancelToken, JsonKind};
use brandkit_llm::{LanguageModel, Models};
use regex::Regex;

use crate::error::CampaignError;
use crate::prompts::{features_prompt, pick_prompt};

/// Vision attempts per slot before giving up.
pub const PICK_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct ImagePicker {
    llm: Arc<dyn LanguageModel>,
    models: Models,
}

struct PickContext {
    llm: Arc<dyn LanguageModel>,
    models: Models,
    candidates: Vec<String>,
    campaign: String,
    chosen: Mutex<HashSet<String>>,
}

impl ImagePicker {
    #[must_use]
    pub fn new(llm: Arc<dyn LanguageModel>, models: Models) -> Self {
        Self { llm, models }
    }

    /// Pick one candidate URL per slot description, in slot order.
    ///
    /// # Errors
    ///
    /// [`CampaignError::ExhaustedRetries`] when a slot cannot settle on an
    /// unclaimed candidate within [`PICK_ATTEMPTS`]; model or parse errors
    /// otherwise.
    pub async fn pick(
        &self,
        slots: &[String],
        candidates: &[String],
        campaign: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, CampaignError> {
        let ctx = Arc::new(PickContext {
            llm: Arc::clone(&self.llm),
            models: self.models.clone(),
            candidates: candidates.to_vec(),
            campaign: campaign.to_string(),
            chosen: Mutex::new(HashSet::new()),
        });
        let handles = spawn_list(cancel, slots.to_vec(), |slot| {
            let ctx = Arc::clone(&ctx);
            async move { ctx.pick_one(&slot).await }
        });
        join_all(handles).await
    }
}

impl PickContext {
    async fn pick_one(&self, slot: &str) -> Result<String, CampaignError> {
        let reply = self
            .llm
            .chat(&features_prompt(slot), &self.models.cheap)
            .await?;
        let features: Vec<String> =
            parse_json(&reply, JsonKind::Array).map_err(|source| CampaignError::Parse {
                what: "image features",
                source,
            })?;

        let mut excluded: HashSet<usize> = HashSet::new();
        for attempt in 1..=PICK_ATTEMPTS {
            let pool = self.pool(&excluded);
            if pool.is_empty() {
                break;
            }
            let images: Vec<String> = pool.iter().map(|&i| self.candidates[i].clone()).collect();
            let reply = self
                .llm
                .vision(
                    &pick_prompt(&features, &self.campaign, slot, &pool),
                    &images,
                    &self.models.primary,
                )
                .await?;

            let Some(label) = parse_label(&reply).filter(|label| pool.contains(label)) else {
                tracing::warn!(slot, attempt, reply = %reply.trim(), "image pick outside the offered pool");
                continue;
            };

            let url = &self.candidates[label];
            let mut chosen = self.chosen.lock().unwrap_or_else(PoisonError::into_inner);
            if chosen.contains(url) {
                drop(chosen);
                tracing::info!(slot, attempt, url = %url, "image already picked by another slot; retrying");
                excluded.insert(label);
                continue;
            }
            chosen.insert(url.clone());
            tracing::debug!(slot, attempt, url = %url, "picked image");
            return Ok(url.clone());
        }

        Err(CampaignError::ExhaustedRetries {
            what: format!("image for \"{slot}\""),
            attempts: PICK_ATTEMPTS,
        })
    }

    /// Candidate indices that are neither claimed nor excluded for this slot.
    fn pool(&self, excluded: &HashSet<usize>) -> Vec<usize> {
        let chosen = self.chosen.lock().unwrap_or_else(PoisonError::into_inner);
        self.candidates
            .iter()
            .enumerate()
            .filter(|(i, url)| !excluded.contains(i) && !chosen.contains(*url))
            .map(|(i, _)| i)
            .collect()
    }
}

static LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid label regex"));

/// First run of ASCII digits in the reply.
fn parse_label(reply: &str) -> Option<usize> {
    LABEL.find(reply)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_first_number_in_reply() {
        assert_eq!(parse_label("3"), Some(3));
        assert_eq!(parse_label("  Image 12 fits best"), Some(12));
        assert_eq!(parse_label("{\"label\": 0}"), Some(0));
        assert_eq!(parse_label("none of them"), None);
    }
}
