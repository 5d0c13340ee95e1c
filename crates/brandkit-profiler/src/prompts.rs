//! Prompt text for the profiling pipeline.

pub(crate) fn palette_prompt(count: usize) -> String {
    format!(
        "You are a brand designer. The image is a screenshot of a business's home page. \
         Identify the {count} most prominent brand colours, most dominant first. \
         Ignore plain white and black unless they clearly carry the brand. \
         Respond with only a JSON array of hex strings such as [\"#1a2b3c\"]."
    )
}

pub(crate) fn summary_prompt(site_text: &str) -> String {
    format!(
        "You are a marketing analyst. Below is text scraped from the pages of one business's \
         website. Describe the business.\n\n\
         Respond with only a JSON object with these string fields:\n\
         - \"name\": the business name\n\
         - \"summary\": what the business offers, in 3-5 sentences\n\
         - \"brand_voice\": adjectives describing how the brand speaks\n\
         - \"target_region\": where its customers are, or \"global\"\n\
         - \"target_audience\": who its customers are\n\n\
         Website text:\n{site_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_site_text() {
        let prompt = summary_prompt("URL: https://x.test/\nTitle: Bakery");
        assert!(prompt.ends_with("Title: Bakery"));
        assert!(prompt.contains("\"target_audience\""));
    }
}
