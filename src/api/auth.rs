//! Authentication token providers.
//!
//! The collection client asks a `TokenProvider` for a bearer token on every
//! request. Where the token comes from is up to the caller: a fixed value,
//! an environment variable, or the OS keyring.

use std::fmt;

use super::error::{ApiError, Result};

/// The keyring service name for incubadmin tokens.
const KEYRING_SERVICE: &str = "incubadmin";

/// Environment variable consulted by `EnvToken`.
pub const TOKEN_ENV_VAR: &str = "INCUBADMIN_TOKEN";

/// Supplies the bearer token attached to API requests.
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// The current token, if any.
    fn token(&self) -> Option<String>;
}

/// No authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token supplied at startup.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"<redacted>").finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Reads the token from `INCUBADMIN_TOKEN` on each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvToken;

impl TokenProvider for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// A token stored in the OS keyring.
///
/// The token is fetched once when the provider is created.
#[derive(Clone)]
pub struct KeyringToken {
    account: String,
    token: String,
}

impl KeyringToken {
    /// Load the token stored for `account`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Keyring` if the entry is missing or the keyring is
    /// unavailable.
    pub fn load(account: &str) -> Result<Self> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;
        let token = entry
            .get_password()
            .map_err(|e| ApiError::Keyring(format!("no token stored for '{}': {}", account, e)))?;
        Ok(Self {
            account: account.to_string(),
            token,
        })
    }

    /// The keyring account this token was read from.
    pub fn account(&self) -> &str {
        &self.account
    }
}

impl fmt::Debug for KeyringToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyringToken")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl TokenProvider for KeyringToken {
    fn token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Build the `Authorization` header value for a token.
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_no_token() {
        assert_eq!(NoToken.token(), None);
    }

    #[test]
    fn test_static_token() {
        let provider = StaticToken::new("abc123");
        assert_eq!(provider.token(), Some("abc123".to_string()));
    }

    #[test]
    fn test_static_token_debug_is_redacted() {
        let provider = StaticToken::new("secret-value");
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    #[serial]
    fn test_env_token_present() {
        std::env::set_var(TOKEN_ENV_VAR, "from-env");
        assert_eq!(EnvToken.token(), Some("from-env".to_string()));
        std::env::remove_var(TOKEN_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_env_token_blank_is_none() {
        std::env::set_var(TOKEN_ENV_VAR, "   ");
        assert_eq!(EnvToken.token(), None);
        std::env::remove_var(TOKEN_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_env_token_absent() {
        std::env::remove_var(TOKEN_ENV_VAR);
        assert_eq!(EnvToken.token(), None);
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer_header("abc"), "Bearer abc");
    }
}
