//! Prompt builders for theme generation, template planning, image picking,
//! rephrasing and the research report.

use std::fmt::Write as _;

use brandkit_core::{BusinessSummary, CampaignTheme, FieldKind, PageContents, SocialPost, Template};

fn business_block(summary: &BusinessSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Business: {}", summary.name);
    let _ = writeln!(out, "Summary: {}", summary.summary);
    if !summary.brand_voice.is_empty() {
        let _ = writeln!(out, "Brand voice: {}", summary.brand_voice);
    }
    if !summary.target_region.is_empty() {
        let _ = writeln!(out, "Region: {}", summary.target_region);
    }
    if !summary.target_audience.is_empty() {
        let _ = writeln!(out, "Audience: {}", summary.target_audience);
    }
    if !summary.colors.is_empty() {
        let _ = writeln!(out, "Brand colours: {}", summary.colors.join(", "));
    }
    out
}

pub(crate) fn theme_prompt(summary: &BusinessSummary, pages: &[PageContents]) -> String {
    let mut out = String::from(
        "You are a social-media marketing strategist. Propose marketing campaign themes \
         for the business below, each anchored on one of its web pages.\n\n",
    );
    out.push_str(&business_block(summary));
    out.push_str("\nPages:\n");
    for page in pages {
        out.push_str(&page.to_text());
        out.push('\n');
    }
    out.push_str(
        "\nRespond with only a JSON array. Each element is an object with:\n\
         - \"theme\": a short campaign concept\n\
         - \"keywords\": 5 to 10 long-tail search keywords for the concept\n\
         - \"url\": the page URL the campaign promotes, copied from the list above\n\
         - \"selectedUrl\": the same URL\n\
         - \"imageCanvaTemplateDescription\": one sentence describing the ideal visual\n",
    );
    out
}

pub(crate) fn plan_prompt(
    summary: &BusinessSummary,
    theme: &CampaignTheme,
    template: &Template,
    page_body: &str,
) -> String {
    let mut out = String::from(
        "You are a copywriter filling in a social-media design template.\n\n",
    );
    out.push_str(&business_block(summary));
    let _ = writeln!(out, "\nCampaign theme: {}", theme.theme);
    let _ = writeln!(out, "Primary keyword: {}", theme.primary_keyword);
    if !theme.secondary_keyword.is_empty() {
        let _ = writeln!(out, "Secondary keyword: {}", theme.secondary_keyword);
    }
    let _ = writeln!(out, "Visual direction: {}", theme.image_template_description);
    let _ = writeln!(
        out,
        "\nTemplate \"{}\" for {}: {}",
        template.title,
        template.platforms.join(", "),
        template.description
    );
    out.push_str("Fields:\n");
    for field in &template.fields {
        match field.kind {
            FieldKind::Text => {
                let _ = writeln!(
                    out,
                    "- {} (text, at most {} characters)",
                    field.name, field.max_chars
                );
            }
            FieldKind::Image => {
                let _ = writeln!(out, "- {} (image: describe the picture it needs)", field.name);
            }
        }
    }
    if !template.color_fields.is_empty() {
        out.push_str("Colour fields (pick hex values, preferably from the brand colours):\n");
        for field in &template.color_fields {
            let _ = writeln!(out, "- {}", field.name);
        }
    }
    let _ = write!(
        out,
        "\nLanding page text:\n{page_body}\n\n\
         Respond with only a JSON object:\n\
         {{\"platform\": \"<one of the template platforms>\", \
         \"fields\": [{{\"name\": \"<field>\", \"kind\": \"text\" or \"image\", \"value\": \"...\"}}], \
         \"color_fields\": [{{\"name\": \"<field>\", \"hex\": \"#rrggbb\"}}], \
         \"caption\": \"<post caption with hashtags>\"}}"
    );
    out
}

pub(crate) fn features_prompt(slot: &str) -> String {
    format!(
        "List ten short visual features a photo must show to match this description: \
         \"{slot}\". Respond with only a JSON array of ten strings."
    )
}

pub(crate) fn pick_prompt(features: &[String], campaign: &str, slot: &str, labels: &[usize]) -> String {
    let labels = labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are choosing a photo for a marketing design.\n\
         Campaign: {campaign}\n\
         Wanted image: {slot}\n\
         Visual features: {}\n\n\
         The images follow in this order and carry the labels {labels}. \
         Respond with only the label of the best matching image.",
        features.join("; ")
    )
}

pub(crate) fn rephrase_prompt(text: &str, max_chars: usize) -> String {
    format!(
        "Rephrase the following marketing text in at most {max_chars} characters, keeping \
         its meaning and tone. Respond with only the rephrased text.\n\n{text}"
    )
}

pub(crate) fn report_prompt(theme: &CampaignTheme, posts: &[SocialPost]) -> String {
    let mut out = format!(
        "You are a social-media researcher. Summarise what people are posting about \
         \"{}\" and what that means for a campaign on \"{}\". Cover recurring topics, \
         tone, and content formats that perform well, in a short report.\n\nPosts:\n",
        theme.primary_keyword, theme.theme
    );
    if posts.is_empty() {
        out.push_str("(no posts found)\n");
    }
    for post in posts {
        let _ = writeln!(out, "- [{}] {} ({})", post.platform, post.text, post.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use brandkit_core::TemplateField;

    use super::*;

    #[test]
    fn plan_prompt_lists_field_limits() {
        let template = Template {
            id: "T1".into(),
            title: "Promo".into(),
            platforms: vec!["instagram".into()],
            fields: vec![
                TemplateField {
                    name: "headline".into(),
                    kind: FieldKind::Text,
                    max_chars: 40,
                },
                TemplateField {
                    name: "hero".into(),
                    kind: FieldKind::Image,
                    max_chars: 0,
                },
            ],
            ..Template::default()
        };
        let prompt = plan_prompt(
            &BusinessSummary::default(),
            &CampaignTheme::default(),
            &template,
            "Fresh bread",
        );
        assert!(prompt.contains("- headline (text, at most 40 characters)"));
        assert!(prompt.contains("- hero (image"));
        assert!(prompt.contains("Fresh bread"));
    }

    #[test]
    fn pick_prompt_names_the_labels_offered() {
        let prompt = pick_prompt(&["warm light".into()], "Spring", "a loaf", &[0, 3]);
        assert!(prompt.contains("labels 0, 3"));
    }
}
