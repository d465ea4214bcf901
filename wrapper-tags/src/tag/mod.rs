mod markup;
pub mod vocabulary;

use serde::{Deserialize, Serialize};

pub use vocabulary::TagVocabulary;

/// A `name="value"` pair carried by an opening tag. Both parts are non-empty
/// once the tag has been through [`crate::attributes::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One HTML tag opened or closed by a group block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagToken {
    #[serde(rename = "tag")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl TagToken {
    pub fn new(name: impl Into<String>) -> Self {
        TagToken {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }
}

/// The tag list stored on a group block, as far as it could be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum TagPayload {
    Tags(Vec<TagToken>),
    /// The stored value is missing, not a tag list, or an empty list.
    Corrupt(String),
}

const EMPTY_LIST: &str = "empty tag list";
const EMPTY_NAME: &str = "empty tag name";

/// Why a decoded list cannot be used as a payload.
fn unusable(tags: &[TagToken]) -> Option<&'static str> {
    if tags.is_empty() {
        Some(EMPTY_LIST)
    } else if tags.iter().any(|t| t.name.trim().is_empty()) {
        Some(EMPTY_NAME)
    } else {
        None
    }
}

impl TagPayload {
    /// Decode a stored tag list.
    pub fn decode(value: Option<toml::Value>) -> TagPayload {
        let Some(value) = value else {
            return TagPayload::Corrupt("missing tag list".to_string());
        };
        match value.try_into::<Vec<TagToken>>() {
            Ok(tags) => TagPayload::from(tags),
            Err(e) => TagPayload::Corrupt(e.to_string().trim().to_string()),
        }
    }

    /// The tags of a usable payload. `Tags` built by hand with no entries or
    /// a blank name is rejected here as well.
    pub fn tokens(&self) -> Result<&[TagToken], &str> {
        match self {
            TagPayload::Tags(tags) => match unusable(tags) {
                Some(reason) => Err(reason),
                None => Ok(tags),
            },
            TagPayload::Corrupt(reason) => Err(reason),
        }
    }
}

impl From<Vec<TagToken>> for TagPayload {
    fn from(tags: Vec<TagToken>) -> Self {
        match unusable(&tags) {
            Some(reason) => TagPayload::Corrupt(reason.to_string()),
            None => TagPayload::Tags(tags),
        }
    }
}
