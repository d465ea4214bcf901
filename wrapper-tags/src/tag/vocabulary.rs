use crate::attributes::NormalizeError;
use crate::tag::TagToken;

/// The tag names an editor may pick for group blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVocabulary {
    tags: Vec<String>,
}

impl TagVocabulary {
    /// Parse the `<div><span><section>` notation used in the settings.
    pub fn parse(allowed: &str) -> Self {
        let allowed = allowed.trim();
        let allowed = allowed.strip_prefix('<').unwrap_or(allowed);
        let allowed = allowed.strip_suffix('>').unwrap_or(allowed);
        let tags = allowed
            .split("><")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        TagVocabulary { tags }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    /// Reject the first tag whose name is not in the vocabulary.
    pub fn check(&self, tags: &[TagToken]) -> Result<(), NormalizeError> {
        match tags.iter().position(|t| !self.contains(&t.name)) {
            Some(position) => Err(NormalizeError::TagNotAllowed {
                tag: tags[position].name.clone(),
                position,
            }),
            None => Ok(()),
        }
    }
}
