//! Keyword scoring: pick the two most exploitable keywords of a theme.
//!
//! Each keyword is scored on four min-max normalised features (top-of-page
//! bids, competition index, and inverted KD = monthly searches / total search
//! results), combined linearly with [`KeywordWeights`].

use std::collections::{HashMap, HashSet};

use brandkit_core::{KeywordMetric, KeywordWeights};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredKeyword {
    pub keyword: String,
    pub score: f64,
}

/// Score every keyword that has a positive search-result count.
///
/// Keywords missing from `result_counts`, or whose count is the `-1`
/// unknown sentinel (or any other non-positive value), are dropped. Repeated
/// keywords keep their first metric. Output follows input order.
#[must_use]
pub fn score_keywords(
    metrics: &[KeywordMetric],
    result_counts: &HashMap<String, i64>,
    weights: &KeywordWeights,
) -> Vec<ScoredKeyword> {
    let mut seen = HashSet::new();
    let survivors: Vec<(&KeywordMetric, f64)> = metrics
        .iter()
        .filter(|m| seen.insert(m.keyword.as_str()))
        .filter_map(|m| {
            let count = *result_counts.get(&m.keyword)?;
            (count > 0).then(|| (m, inverted_kd(m.avg_monthly_searches, count)))
        })
        .collect();

    let high = Feature::new(survivors.iter().map(|(m, _)| m.high_top_of_page_bid));
    let low = Feature::new(survivors.iter().map(|(m, _)| m.low_top_of_page_bid));
    let competition = Feature::new(survivors.iter().map(|(m, _)| m.competition_index));
    let kd = Feature::new(survivors.iter().map(|(_, kd)| *kd));

    survivors
        .iter()
        .map(|(m, inverted)| ScoredKeyword {
            keyword: m.keyword.clone(),
            score: weights.high_bid * high.normalise(m.high_top_of_page_bid)
                + weights.low_bid * low.normalise(m.low_top_of_page_bid)
                + weights.competition * competition.normalise(m.competition_index)
                + weights.inverted_kd * kd.normalise(*inverted),
        })
        .collect()
}

/// `(primary, secondary)` by score. Empty strings stand in for missing picks.
///
/// A later keyword displaces an earlier one only with a strictly higher
/// score, so ties go to input order.
#[must_use]
pub fn pick_keywords(
    metrics: &[KeywordMetric],
    result_counts: &HashMap<String, i64>,
    weights: &KeywordWeights,
) -> (String, String) {
    let scored = score_keywords(metrics, result_counts, weights);

    let mut primary: Option<&ScoredKeyword> = None;
    let mut secondary: Option<&ScoredKeyword> = None;
    for candidate in &scored {
        match primary {
            Some(p) if candidate.score <= p.score => {
                if secondary.map_or(true, |s| candidate.score > s.score) {
                    secondary = Some(candidate);
                }
            }
            _ => {
                secondary = primary;
                primary = Some(candidate);
            }
        }
    }

    let name = |k: Option<&ScoredKeyword>| k.map(|k| k.keyword.clone()).unwrap_or_default();
    (name(primary), name(secondary))
}

#[allow(clippy::cast_precision_loss)]
fn inverted_kd(monthly_searches: i64, result_count: i64) -> f64 {
    monthly_searches as f64 / result_count as f64
}

struct Feature {
    min: f64,
    max: f64,
}

impl Feature {
    fn new(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Self { min, max }
    }

    /// `0.0` when every value is the same.
    fn normalise(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
