//! Session tokens.

use std::fmt;

use mockall::automock;
use zeroize::Zeroize;

/// The two opaque tokens every remote call carries.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    access_token: String,
    client_token: String,
}

impl SessionTokens {
    /// Pair an access token with a client token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, client_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            client_token: client_token.into(),
        }
    }

    /// Bearer token for the `Authorization` header.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Tenant-scoped client token.
    #[must_use]
    pub fn client_token(&self) -> &str {
        &self.client_token
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionTokens(**redacted**)")?;
        Ok(())
    }
}

impl Drop for SessionTokens {
    fn drop(&mut self) {
        self.access_token.zeroize();
        self.client_token.zeroize();
    }
}

/// Supplies the current session, if there is one.
#[automock]
pub trait SessionProvider: Send + Sync {
    /// Current tokens; `None` while not authenticated.
    fn tokens(&self) -> Option<SessionTokens>;
}

/// A session fixed at startup, e.g. from the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    tokens: Option<SessionTokens>,
}

impl StaticSession {
    /// Build a session from optional tokens; both must be present and non-blank.
    #[must_use]
    pub fn new(access_token: Option<String>, client_token: Option<String>) -> Self {
        let non_blank = |token: Option<String>| token.filter(|token| !token.trim().is_empty());

        Self {
            tokens: non_blank(access_token)
                .zip(non_blank(client_token))
                .map(|(access, client)| SessionTokens::new(access, client)),
        }
    }
}

impl SessionProvider for StaticSession {
    fn tokens(&self) -> Option<SessionTokens> {
        self.tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let tokens = SessionTokens::new("secret-access", "secret-client");

        let rendered = format!("{tokens:?}");

        assert!(!rendered.contains("secret"), "tokens leaked: {rendered}");
    }

    #[test]
    fn static_session_requires_both_tokens() {
        assert!(StaticSession::new(Some("a".to_string()), None).tokens().is_none());
        assert!(StaticSession::new(Some("a".to_string()), Some("  ".to_string())).tokens().is_none());

        let tokens = StaticSession::new(Some("a".to_string()), Some("c".to_string())).tokens();

        assert_eq!(tokens.as_ref().map(SessionTokens::access_token), Some("a"));
        assert_eq!(tokens.as_ref().map(SessionTokens::client_token), Some("c"));
    }
}
