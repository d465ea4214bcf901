mod error;

use serde::Deserialize;

pub use error::NormalizeError;

use crate::tag::{Attribute, TagToken};

/// A tag definition as submitted by the editor form, before cleaning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl RawAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        RawAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Clean the tag definitions of one group block before they are stored.
///
/// Attribute names lose all whitespace and values are trimmed. Rows with both
/// parts empty are dropped; a name without a value, a value without a name and
/// a purely numeric name are rejected.
pub fn normalize(tags: Vec<RawTag>) -> Result<Vec<TagToken>, NormalizeError> {
    tags.into_iter()
        .enumerate()
        .map(|(position, raw)| normalize_tag(position, raw))
        .collect()
}

fn normalize_tag(position: usize, raw: RawTag) -> Result<TagToken, NormalizeError> {
    let name = raw.tag.trim();
    if name.is_empty() {
        return Err(NormalizeError::EmptyTagName { position });
    }

    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for attribute in raw.attributes {
        if let Some(attribute) = normalize_attribute(attribute)? {
            attributes.push(attribute);
        }
    }

    Ok(TagToken {
        name: name.to_string(),
        attributes,
    })
}

fn normalize_attribute(raw: RawAttribute) -> Result<Option<Attribute>, NormalizeError> {
    let name: String = raw.name.chars().filter(|c| !c.is_whitespace()).collect();
    let value = raw.value.trim();

    match (name.is_empty(), value.is_empty()) {
        (true, true) => return Ok(None),
        (false, true) => return Err(NormalizeError::AttributeNameWithoutValue { name }),
        (true, false) => {
            return Err(NormalizeError::AttributeValueWithoutName {
                value: value.to_string(),
            });
        }
        (false, false) => {}
    }

    if is_numeric(&name) {
        return Err(NormalizeError::NumericAttributeName { name });
    }

    Ok(Some(Attribute {
        name,
        value: value.to_string(),
    }))
}

/// Decimal integers and floats, optionally signed, with an optional exponent.
fn is_numeric(s: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E');
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(allowed) && s.parse::<f64>().is_ok()
}
