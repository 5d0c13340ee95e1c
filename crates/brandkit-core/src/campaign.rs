use serde::{Deserialize, Serialize};

/// Marketing concept plus its keyword bundle.
///
/// Field names on the wire follow the camelCase keys the theme prompt asks
/// the model to emit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTheme {
    pub theme: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub selected_url: String,
    #[serde(default, rename = "imageCanvaTemplateDescription")]
    pub image_template_description: String,
    #[serde(default)]
    pub primary_keyword: String,
    #[serde(default)]
    pub secondary_keyword: String,
}
