use serde::{Deserialize, Serialize};
use wrapper_tags::block::WrapperRegistry;
use wrapper_tags::tag::TagVocabulary;

/// A start/stop element pair registered by another extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperPair {
    pub start: String,
    pub stop: String,
}

/// Extension settings as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tags offered for selection, in `<div><span>` notation.
    pub allowed_tags: String,
    /// Colorize indented rows.
    pub colorize: bool,
    /// Validate as usual but do not display the result.
    pub hide_validation_status: bool,
    /// Singleton wrappers beyond accordion and slider.
    pub wrappers: Vec<WrapperPair>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            allowed_tags: "<div><section><article><aside><header><footer><main><nav><span>"
                .to_string(),
            colorize: false,
            hide_validation_status: false,
            wrappers: Vec::new(),
        }
    }
}

impl Settings {
    pub fn vocabulary(&self) -> TagVocabulary {
        TagVocabulary::parse(&self.allowed_tags)
    }

    pub fn registry(&self) -> WrapperRegistry {
        self.wrappers
            .iter()
            .fold(WrapperRegistry::default(), |registry, pair| {
                registry.with_pair(pair.start.as_str(), pair.stop.as_str())
            })
    }
}
