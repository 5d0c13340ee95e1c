use std::path::Path;

use super::*;

const VALID: &str = r#"
templates:
  - id: tpl-promo
    title: Promo square
    platforms: [instagram, facebook]
    export_type: png
    description: Square promo with headline and hero image
    fields:
      - { name: headline, kind: text, max_chars: 40 }
      - { name: hero, kind: image }
    color_fields:
      - { name: background }
"#;

#[test]
fn parses_valid_catalogue() {
    let file = parse_templates(VALID).expect("parse");
    assert_eq!(file.templates.len(), 1);
    let template = &file.templates[0];
    assert_eq!(template.text_fields().count(), 1);
    assert_eq!(template.image_fields().count(), 1);
    assert_eq!(template.field("headline").map(|f| f.max_chars), Some(40));
    assert!(template.embedding.is_none());
}

#[test]
fn rejects_duplicate_template_id() {
    let yaml = r"
templates:
  - { id: a, title: One }
  - { id: a, title: Two }
";
    let err = parse_templates(yaml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate template id")),
        "got: {err:?}"
    );
}

#[test]
fn rejects_empty_template_id() {
    let yaml = r#"
templates:
  - { id: "  ", title: Blank }
"#;
    assert!(matches!(
        parse_templates(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn rejects_text_field_without_budget() {
    let yaml = r"
templates:
  - id: a
    title: One
    fields:
      - { name: headline, kind: text }
";
    let err = parse_templates(yaml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("max_chars")),
        "got: {err:?}"
    );
}

#[test]
fn rejects_colour_slot_shadowing_field() {
    let yaml = r"
templates:
  - id: a
    title: One
    fields:
      - { name: accent, kind: image }
    color_fields:
      - { name: accent }
";
    assert!(matches!(
        parse_templates(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn rejects_unknown_field_kind() {
    let yaml = r"
templates:
  - id: a
    title: One
    fields:
      - { name: clip, kind: video }
";
    assert!(matches!(
        parse_templates(yaml),
        Err(ConfigError::TemplatesFileParse(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_templates(Path::new("/nonexistent/templates.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::TemplatesFileIo { .. }));
}

#[test]
fn load_templates_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root")
        .join("config")
        .join("templates.yaml");
    assert!(
        path.exists(),
        "templates.yaml missing at {path:?}; required for this test"
    );
    let file = load_templates(&path).expect("failed to load templates.yaml");
    assert!(
        !file.templates.is_empty(),
        "templates.yaml should contain at least one template"
    );
}

#[test]
fn template_result_reads_vendor_design() {
    let json = r#"{"design":{"id":"D1","title":"Promo","url":"https://vendor.test/d/D1","thumbnail":{"url":"https://vendor.test/t.png","width":400}}}"#;
    let result: TemplateResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.design.id, "D1");
    assert_eq!(
        result.design.thumbnail.as_ref().and_then(|t| t.width),
        Some(400)
    );
}
