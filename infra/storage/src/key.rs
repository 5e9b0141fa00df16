use crate::engine::TMP_MARKER;
use crate::error::StorageError;
use std::fmt;

/// A validated logical key, mapped to exactly one file directly under the store root.
///
/// Keys are 1 to [`StorageKey::MAX_LEN`] characters of ASCII letters, digits, `_`, `-`
/// and `.`, and may not start with a dot. Separators never pass validation, so a key can
/// not address anything outside the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub const MAX_LEN: usize = 128;

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(raw: &str) -> Result<(), StorageError> {
        if raw.is_empty() {
            return Err(StorageError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Storage key cannot be empty".into()),
            });
        }

        if raw.len() > Self::MAX_LEN {
            return Err(StorageError::InvalidKey {
                message: format!("{} characters", raw.len()).into(),
                context: Some("Storage key is too long".into()),
            });
        }

        if raw.starts_with('.') || raw.contains(TMP_MARKER) {
            return Err(StorageError::InvalidKey {
                message: raw.to_owned().into(),
                context: Some("Storage key collides with hidden or temporary files".into()),
            });
        }

        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            return Err(StorageError::InvalidKey {
                message: raw.to_owned().into(),
                context: Some("Storage key contains illegal characters".into()),
            });
        }

        Ok(())
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        Self::validate(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::validate(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&Self> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &Self) -> Result<Self, StorageError> {
        Ok(value.clone())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
