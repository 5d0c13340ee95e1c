//! Bring planner text within each template field's character budget.

use std::sync::Arc;

use brandkit_autofill::TextField;
use brandkit_core::tasks::{join_all, spawn_list};
use brandkit_core::{CancelToken, FieldKind, PopulatedField, Template};
use brandkit_llm::LanguageModel;

use crate::error::CampaignError;
use crate::prompts::rephrase_prompt;

pub const REPHRASE_ATTEMPTS: usize = 3;

/// Fit every planned text field to its template limit.
///
/// Fields the template does not define as text are dropped. Overlong values
/// are rephrased in parallel; the shortest rephrasing wins and is cut at the
/// limit if it still overflows. Output keeps the planner's field order.
///
/// # Errors
///
/// Model errors from a rephrase request.
pub async fn fit_text_fields(
    llm: &Arc<dyn LanguageModel>,
    model: &str,
    template: &Template,
    fields: &[PopulatedField],
    cancel: &CancelToken,
) -> Result<Vec<TextField>, CampaignError> {
    let mut budgeted = Vec::new();
    for field in fields.iter().filter(|f| f.kind == FieldKind::Text) {
        match template.field(&field.name) {
            Some(slot) if slot.kind == FieldKind::Text => {
                budgeted.push((field.name.clone(), field.value.clone(), slot.max_chars));
            }
            _ => tracing::warn!(
                template = %template.id,
                field = %field.name,
                "planned text field is not a text field of the template; dropping it"
            ),
        }
    }

    let handles = spawn_list(cancel, budgeted, |(name, text, max_chars)| {
        let llm = Arc::clone(llm);
        let model = model.to_string();
        async move {
            let text = fit(llm.as_ref(), &model, text, max_chars).await?;
            Ok::<_, CampaignError>(TextField { name, text })
        }
    });
    join_all(handles).await
}

async fn fit(
    llm: &dyn LanguageModel,
    model: &str,
    text: String,
    max_chars: usize,
) -> Result<String, CampaignError> {
    if char_len(&text) <= max_chars {
        return Ok(text);
    }

    let mut best = text;
    for attempt in 1..=REPHRASE_ATTEMPTS {
        let reply = llm.chat(&rephrase_prompt(&best, max_chars), model).await?;
        let reply = reply.trim().trim_matches('"').trim().to_string();
        if !reply.is_empty() && char_len(&reply) < char_len(&best) {
            best = reply;
        }
        if char_len(&best) <= max_chars {
            return Ok(best);
        }
        tracing::debug!(attempt, len = char_len(&best), max_chars, "rephrase still too long");
    }

    tracing::info!(max_chars, "truncating text that would not fit");
    Ok(truncate_chars(&best, max_chars))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max_chars` characters, with trailing whitespace removed.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ends with space ", 15), "ends with space");
        assert_eq!(truncate_chars("anything", 0), "");
    }
}
