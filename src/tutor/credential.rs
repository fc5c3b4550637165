use std::fmt;

use thiserror::Error;

/// Template value left in place until a deployment injects a real key.
pub const API_KEY_PLACEHOLDER: &str = "REPLACE_ME_WITH_API_KEY";

const MIN_KEY_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("API key is empty")]
    Empty,
    #[error("API key is too short ({0} characters, need at least 10)")]
    TooShort(usize),
    #[error("API key placeholder was never replaced")]
    Placeholder,
}

/// A validated API key. `Debug` hides the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        if key == API_KEY_PLACEHOLDER {
            return Err(CredentialError::Placeholder);
        }
        let len = key.chars().count();
        if len < MIN_KEY_LEN {
            return Err(CredentialError::TooShort(len));
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "ApiKey({}…)", prefix)
    }
}

/// Whether the tutor can be called.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credential {
    #[default]
    Unconfigured,
    Configured(ApiKey),
}

impl Credential {
    /// Interpret a stored value. Anything that no longer validates counts as
    /// unconfigured.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(ApiKey::parse) {
            Some(Ok(key)) => Credential::Configured(key),
            _ => Credential::Unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }

    pub fn key(&self) -> Option<&ApiKey> {
        match self {
            Credential::Configured(key) => Some(key),
            Credential::Unconfigured => None,
        }
    }
}
