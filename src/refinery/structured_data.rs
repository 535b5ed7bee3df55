// * Structured-Data Decoder
// * Locates the embedded JSON-LD block and parses it into a navigable object.
// * A missing block is permanent for the item; a block that fails to parse is transient.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

static SELECTOR_JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid JSON-LD selector")
});

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Document carries no structured-data block")]
    Absent,

    #[error("Structured-data block is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl DecodeError {
    /// The source serves truncated payloads under load, so a parse failure is worth a re-fetch
    pub fn is_transient(&self) -> bool {
        matches!(self, DecodeError::Malformed(_))
    }
}

/// One credited entity from a structured `director`/`creator`/`actor` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub kind: Option<String>,
    /// Organization credits often carry only `@type` and `url`
    pub name: Option<String>,
}

impl Credit {
    /// Entries without a type tag are taken to be people
    pub fn is_person(&self) -> bool {
        self.kind.as_deref().map_or(true, |k| k == "Person")
    }

    /// The name of a credited person; organizations and nameless entries yield nothing
    pub fn person_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|_| self.is_person())
    }
}

/// The selected structured-data object
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredData {
    root: Map<String, Value>,
}

impl StructuredData {
    pub fn empty() -> Self {
        Self { root: Map::new() }
    }

    /// Picks the describing object out of a payload: the object itself, or the first
    /// typed object inside a top-level array or `@graph`
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                if !map.contains_key("@type") {
                    if let Some(Value::Array(graph)) = map.remove("@graph") {
                        if let Some(found) = first_typed(graph) {
                            return Self { root: found };
                        }
                    }
                }
                Self { root: map }
            }
            Value::Array(items) => Self {
                root: first_typed(items).unwrap_or_default(),
            },
            _ => Self::empty(),
        }
    }

    /// The `@type` tag; for a list of tags, the first one
    pub fn kind_tag(&self) -> Option<&str> {
        match self.root.get("@type")? {
            Value::String(tag) => Some(tag.as_str()),
            Value::Array(tags) => tags.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    /// Walks a dotted path such as `aggregateRating.ratingValue`
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut keys = path.split('.');
        let mut current = self.root.get(keys.next()?)?;
        for key in keys {
            current = current.as_object()?.get(key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Non-empty text at a path; numbers are rendered as text
    pub fn text(&self, path: &str) -> Option<String> {
        let text = match self.get(path)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn number(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn integer(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    /// A key holding either a single string or an array of strings
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => vec![s.trim().to_string()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .collect(),
            _ => Vec::new(),
        }
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
    }

    /// Credits under a key: a single object, an array of objects, or bare names.
    /// Returns None when the key is missing entirely.
    pub fn credits(&self, key: &str) -> Option<Vec<Credit>> {
        let value = self.get(key)?;
        let entries = match value {
            Value::Array(items) => items.iter().filter_map(credit_of).collect(),
            other => credit_of(other).into_iter().collect(),
        };
        Some(entries)
    }

    /// An image given as a URL string, an `ImageObject`, or a list of either
    pub fn image_url(&self, key: &str) -> Option<String> {
        image_of(self.get(key)?)
    }
}

fn first_typed(items: Vec<Value>) -> Option<Map<String, Value>> {
    items.into_iter().find_map(|item| match item {
        Value::Object(map) if map.contains_key("@type") => Some(map),
        _ => None,
    })
}

fn credit_of(value: &Value) -> Option<Credit> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(Credit {
            kind: None,
            name: Some(name.trim().to_string()),
        }),
        Value::Object(map) => {
            let kind = map.get("@type").and_then(Value::as_str).map(str::to_string);
            let name = map
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            // * An entry needs at least a type or a name to count as a credit
            if kind.is_none() && name.is_none() {
                return None;
            }
            Some(Credit { kind, name })
        }
        _ => None,
    }
}

fn image_of(value: &Value) -> Option<String> {
    match value {
        Value::String(url) if !url.trim().is_empty() => Some(url.trim().to_string()),
        Value::Object(map) => map.get("url").and_then(image_of),
        Value::Array(items) => items.iter().find_map(image_of),
        _ => None,
    }
}

/// A fetched document paired with its decoded structured data.
///
/// The raw markup is kept as text: the parsed DOM is not `Send`, so it is rebuilt
/// on demand by the extraction step rather than held across await points.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub html: String,
    pub data: StructuredData,
}

/// Finds and parses the structured-data block.
///
/// When several blocks exist, the first one that parses wins. The error is
/// `Malformed` only if at least one block was present and none parsed.
pub fn decode(html: String) -> Result<DecodedPage, DecodeError> {
    let payloads: Vec<String> = {
        let document = Html::parse_document(&html);
        document
            .select(&SELECTOR_JSON_LD)
            .map(|script| script.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
            .collect()
    };

    if payloads.is_empty() {
        return Err(DecodeError::Absent);
    }

    let mut last_error = None;
    for payload in &payloads {
        match serde_json::from_str::<Value>(payload.trim()) {
            Ok(value) => {
                let data = StructuredData::from_value(value);
                return Ok(DecodedPage { html, data });
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(DecodeError::Malformed(e)),
        None => Err(DecodeError::Absent),
    }
}
