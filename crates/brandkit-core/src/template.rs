use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Image,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: String,
    pub kind: FieldKind,
    /// Character budget for text fields. Ignored for images.
    #[serde(default)]
    pub max_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorField {
    pub name: String,
}

/// A vendor brand template and the slots it exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub export_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
    #[serde(default)]
    pub color_fields: Vec<ColorField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Template {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn text_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Text)
    }

    pub fn image_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Image)
    }
}

/// Planner output: what to put in each slot of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTemplate {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub fields: Vec<PopulatedField>,
    #[serde(default)]
    pub color_fields: Vec<PopulatedColor>,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedField {
    pub name: String,
    pub kind: FieldKind,
    /// Text to render, or for images a description of the desired picture.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedColor {
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Rendered design returned by the vendor once a populate job succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResult {
    pub design: Design,
}

#[derive(Debug, Deserialize)]
pub struct TemplatesFile {
    pub templates: Vec<Template>,
}

/// Load and validate the template catalogue from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_templates(path: &Path) -> Result<TemplatesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TemplatesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_templates(&content)
}

/// Parse and validate a template catalogue held in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_templates(content: &str) -> Result<TemplatesFile, ConfigError> {
    let file: TemplatesFile = serde_yaml::from_str(content)?;
    validate_templates(&file)?;
    Ok(file)
}

fn validate_templates(file: &TemplatesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for template in &file.templates {
        if template.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "template id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(template.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate template id: '{}'",
                template.id
            )));
        }

        let mut seen_slots = HashSet::new();
        let slot_names = template
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(template.color_fields.iter().map(|c| c.name.as_str()));
        for name in slot_names {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "template '{}' has a field with an empty name",
                    template.id
                )));
            }
            if !seen_slots.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "template '{}' declares field '{}' twice",
                    template.id, name
                )));
            }
        }

        if let Some(field) = template.text_fields().find(|f| f.max_chars == 0) {
            return Err(ConfigError::Validation(format!(
                "text field '{}' of template '{}' needs a positive max_chars",
                field.name, template.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
