//! Vote value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Longest vote value accepted.
pub const MAX_VOTE_LENGTH: usize = 32;

/// A participant's estimate, e.g. `"5"`, `"13"`, `"?"`.
///
/// Always non-blank. The "no vote" state is not a `Vote`; participant
/// records store it as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vote(String);

impl Vote {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("vote"));
        }
        let len = trimmed.chars().count();
        if len > MAX_VOTE_LENGTH {
            return Err(ValidationError::too_long("vote", MAX_VOTE_LENGTH, len));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_estimates() {
        for v in ["1", "13", "?", "1/2", "coffee"] {
            assert_eq!(Vote::new(v).unwrap().as_str(), v);
        }
    }

    #[test]
    fn rejects_blank_vote() {
        assert_eq!(Vote::new(" "), Err(ValidationError::empty_field("vote")));
    }

    #[test]
    fn rejects_overlong_vote() {
        assert!(Vote::new("9".repeat(MAX_VOTE_LENGTH + 1)).is_err());
    }
}
