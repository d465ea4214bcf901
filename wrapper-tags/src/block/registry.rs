use crate::block::Role;
use crate::tag::TagPayload;

pub const OPENING_TAGS: &str = "openingTags";
pub const CLOSING_TAGS: &str = "closingTags";

/// Element types that open and close wrapper scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperRegistry {
    pub start: Vec<String>,
    pub stop: Vec<String>,
}

impl Default for WrapperRegistry {
    fn default() -> Self {
        WrapperRegistry {
            start: vec![
                "accordionStart".to_string(),
                "sliderStart".to_string(),
                OPENING_TAGS.to_string(),
            ],
            stop: vec![
                "accordionStop".to_string(),
                "sliderStop".to_string(),
                CLOSING_TAGS.to_string(),
            ],
        }
    }
}

impl WrapperRegistry {
    /// Register another extension's singleton wrapper pair.
    pub fn with_pair(mut self, start: impl Into<String>, stop: impl Into<String>) -> Self {
        self.start.push(start.into());
        self.stop.push(stop.into());
        self
    }

    pub fn is_start(&self, element: &str) -> bool {
        self.start.iter().any(|s| s == element)
    }

    pub fn is_stop(&self, element: &str) -> bool {
        self.stop.iter().any(|s| s == element)
    }

    /// Derive the role of an element type. `payload` is only consulted for
    /// the two group types and is decoded lazily by the caller.
    pub fn classify(&self, element: &str, payload: impl FnOnce() -> TagPayload) -> Role {
        if element == OPENING_TAGS {
            Role::OpeningGroup(payload())
        } else if element == CLOSING_TAGS {
            Role::ClosingGroup(payload())
        } else if self.is_start(element) {
            Role::WrapperStart
        } else if self.is_stop(element) {
            Role::WrapperStop
        } else {
            Role::Plain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagToken;

    fn div() -> TagPayload {
        TagPayload::Tags(vec![TagToken::new("div")])
    }

    #[test]
    fn classifies_group_types_before_registry_lookup() {
        let registry = WrapperRegistry::default();
        assert!(matches!(registry.classify("openingTags", div), Role::OpeningGroup(_)));
        assert!(matches!(registry.classify("closingTags", div), Role::ClosingGroup(_)));
    }

    #[test]
    fn classifies_singleton_wrappers() {
        let registry = WrapperRegistry::default().with_pair("boxStart", "boxStop");
        assert_eq!(registry.classify("accordionStart", div), Role::WrapperStart);
        assert_eq!(registry.classify("boxStop", div), Role::WrapperStop);
        assert_eq!(registry.classify("text", div), Role::Plain);
    }

    #[test]
    fn payload_is_not_decoded_for_plain_blocks() {
        let registry = WrapperRegistry::default();
        let role = registry.classify("image", || panic!("payload decoded for a plain block"));
        assert_eq!(role, Role::Plain);
    }
}
