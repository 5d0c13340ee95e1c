use serde::{Deserialize, Serialize};

/// Search-advertising metrics for one keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordMetric {
    pub keyword: String,
    pub avg_monthly_searches: i64,
    /// Vendor label such as `LOW`, `MEDIUM`, `HIGH`.
    pub competition: String,
    /// 0–100.
    pub competition_index: f64,
    pub low_top_of_page_bid: f64,
    pub high_top_of_page_bid: f64,
}

/// Linear weights applied to the normalised keyword features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordWeights {
    pub high_bid: f64,
    pub low_bid: f64,
    pub competition: f64,
    pub inverted_kd: f64,
}

impl Default for KeywordWeights {
    fn default() -> Self {
        Self {
            high_bid: 0.05,
            low_bid: 0.05,
            competition: 0.30,
            inverted_kd: 0.50,
        }
    }
}
