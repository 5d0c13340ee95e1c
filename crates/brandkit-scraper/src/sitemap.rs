//! Pure helpers for turning a raw sitemap into a ranked crawl list.

use std::collections::HashSet;

use reqwest::Url;

const SKIPPED_EXTENSIONS: [&str; 2] = [".xml", ".pdf"];

/// Drop sitemap entries that point at nested sitemaps or documents.
#[must_use]
pub fn filter_sitemap(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter(|url| {
            let lower = url.trim().to_ascii_lowercase();
            !SKIPPED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each URL.
#[must_use]
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Number of `/` separators inside the URL path once leading and trailing
/// slashes are trimmed. `https://x.test/` and `https://x.test/a` are both 0.
#[must_use]
pub fn path_depth(url: &str) -> usize {
    let parsed = Url::parse(url);
    let path = match &parsed {
        Ok(u) => u.path(),
        Err(_) => url,
    };
    path.trim_matches('/').matches('/').count()
}

/// Stable sort by ascending path depth.
pub fn sort_by_proximity(urls: &mut [String]) {
    urls.sort_by_key(|url| path_depth(url));
}

/// Dedup, sort by proximity to the root, and keep the first `limit`.
#[must_use]
pub fn rank_pages(urls: Vec<String>, limit: usize) -> Vec<String> {
    let mut urls = dedup_urls(urls);
    sort_by_proximity(&mut urls);
    urls.truncate(limit);
    urls
}
