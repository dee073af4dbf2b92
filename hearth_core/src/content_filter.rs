use thiserror::Error;

use crate::config::ContentSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content cannot be empty")]
    Empty,
    #[error("content is too short, at least {0} characters are required")]
    TooShort(usize),
    #[error("content contains inappropriate language, please revise it")]
    Disallowed,
}

/// Pure validation for user-submitted text.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    min_length: usize,
    max_length: usize,
    // lowercased once up front
    disallowed_terms: Vec<String>,
}

impl ContentFilter {
    pub fn new(settings: &ContentSettings) -> Self {
        Self {
            min_length: settings.min_length,
            max_length: settings.max_length,
            disallowed_terms: settings
                .disallowed_terms
                .iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    /// Returns the content to store: trimmed, and cut to `max_length` chars.
    pub fn validate(&self, content: &str) -> Result<String, ContentError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ContentError::Empty);
        }

        let length = trimmed.chars().count();
        if length < self.min_length {
            return Err(ContentError::TooShort(self.min_length));
        }

        let cleaned: String = if length > self.max_length {
            tracing::debug!(length, max = self.max_length, "truncating oversized content");
            trimmed.chars().take(self.max_length).collect()
        } else {
            trimmed.to_string()
        };

        if self.contains_disallowed(&cleaned) {
            return Err(ContentError::Disallowed);
        }

        Ok(cleaned)
    }

    pub fn contains_disallowed(&self, content: &str) -> bool {
        let lowered = content.to_lowercase();
        self.disallowed_terms
            .iter()
            .any(|term| lowered.contains(term.as_str()))
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(&ContentSettings::default())
    }
}
