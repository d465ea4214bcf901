use thiserror::Error;

/// Rejection of a tag definition at data-entry time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("the attribute name \"{name}\" is without a value")]
    AttributeNameWithoutValue { name: String },

    #[error("the attribute value \"{value}\" is without a name")]
    AttributeValueWithoutName { value: String },

    #[error("the attribute name \"{name}\" must not be a number")]
    NumericAttributeName { name: String },

    #[error("tag #{position} has no name")]
    EmptyTagName { position: usize },

    #[error("the tag <{tag}> (#{position}) is not in the list of allowed tags")]
    TagNotAllowed { tag: String, position: usize },
}
