use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    fn levels(&self) -> [(&'static str, &[String]); 6] {
        [
            ("H1", &self.h1),
            ("H2", &self.h2),
            ("H3", &self.h3),
            ("H4", &self.h4),
            ("H5", &self.h5),
            ("H6", &self.h6),
        ]
    }
}

/// Structured scrape of a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContents {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Headings,
    pub keywords: Vec<String>,
    pub links: Vec<String>,
    pub summary: String,
    pub categories: Vec<String>,
    pub images: Vec<String>,
}

impl PageContents {
    /// Plain-text rendering fed to the language model.
    ///
    /// Empty sections are omitted. Image URLs are not included.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "URL: {}", self.url);
        push_line(&mut out, "Title", &self.title);
        push_line(&mut out, "Description", &self.meta_description);
        for (label, items) in self.headings.levels() {
            push_list(&mut out, label, items);
        }
        push_list(&mut out, "Keywords", &self.keywords);
        push_list(&mut out, "Categories", &self.categories);
        push_line(&mut out, "Summary", &self.summary);
        push_list(&mut out, "Links", &self.links);
        out
    }
}

fn push_line(out: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        let _ = writeln!(out, "{label}: {}", value.trim());
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        let _ = writeln!(out, "{label}: {}", items.join(", "));
    }
}

/// A social-media post surfaced for a keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPost {
    pub platform: String,
    pub text: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_text_skips_empty_sections() {
        let page = PageContents {
            url: "https://example.com/a".into(),
            title: "About".into(),
            headings: Headings {
                h2: vec!["Team".into(), "History".into()],
                ..Headings::default()
            },
            images: vec!["https://example.com/i.png".into()],
            ..PageContents::default()
        };
        let text = page.to_text();
        assert_eq!(
            text,
            "URL: https://example.com/a\nTitle: About\nH2: Team, History\n"
        );
    }

    #[test]
    fn partial_payload_deserialises_with_defaults() {
        let page: PageContents =
            serde_json::from_str(r#"{"url":"https://x.test","images":["a.png"]}"#).unwrap();
        assert_eq!(page.images, vec!["a.png".to_string()]);
        assert!(page.headings.h1.is_empty());
    }
}
