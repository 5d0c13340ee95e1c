use serde::{Deserialize, Serialize};

/// OAuth credentials persisted between runs.
///
/// `expires_in` is an absolute Unix timestamp in seconds on disk even though
/// the token endpoint reports it as a relative lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[serde(alias = "in_progress")]
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobFailure {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A remote job as reported by submit and poll responses.
#[derive(Debug, Clone, Deserialize)]
pub struct PolledJob<R> {
    pub id: String,
    pub status: JobStatus,
    /// Present once the job succeeds. Asset uploads name it `asset`.
    #[serde(default = "Option::default", alias = "asset")]
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<JobFailure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEnvelope<R> {
    pub job: PolledJob<R>,
}

/// Uploaded asset record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A template slot filled with an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetField {
    pub name: String,
    pub asset_id: String,
}

/// A template slot filled with text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum DataEntry<'a> {
    Image { asset_id: &'a str },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
pub(crate) struct AutofillRequest<'a> {
    pub brand_template_id: &'a str,
    pub data: serde_json::Map<String, serde_json::Value>,
}
