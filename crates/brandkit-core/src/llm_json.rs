//! Pull the JSON island out of free-form LLM output.
//!
//! Models wrap JSON in prose and code fences. The extractor is lenient about
//! framing (it looks for the outermost bracket pair) but strict about
//! structure (the island must parse as the requested kind).

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
}

impl JsonKind {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonKind::Object => ('{', '}'),
            JsonKind::Array => ('[', ']'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            JsonKind::Object => value.is_object(),
            JsonKind::Array => value.is_array(),
        }
    }
}

/// Returns the minified JSON document of `kind` found in `text`, or an empty
/// string when there is none.
#[must_use]
pub fn extract_json(text: &str, kind: JsonKind) -> String {
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());
    let (open, close) = kind.delimiters();

    let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) else {
        return String::new();
    };
    if end <= start {
        return String::new();
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value) if kind.matches(&value) => value.to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JsonIslandError {
    #[error("no JSON {kind:?} found in model output")]
    Missing { kind: JsonKind },

    #[error("JSON {kind:?} did not match the expected shape: {source}")]
    Shape {
        kind: JsonKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Extract the island of `kind` and deserialise it into `T`.
///
/// # Errors
///
/// [`JsonIslandError::Missing`] when no island is present,
/// [`JsonIslandError::Shape`] when it does not deserialise into `T`.
pub fn parse_json<T: DeserializeOwned>(text: &str, kind: JsonKind) -> Result<T, JsonIslandError> {
    let island = extract_json(text, kind);
    if island.is_empty() {
        return Err(JsonIslandError::Missing { kind });
    }
    serde_json::from_str(&island).map_err(|source| JsonIslandError::Shape { kind, source })
}
