//! Bearer credentials
//!
//! The store never looks a token up on its own; whoever builds it passes a
//! `CredentialSource`. How the token got there (login screen, environment,
//! config file) is not this crate's concern.

use std::sync::{Arc, PoisonError, RwLock};

/// A bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token; blank tokens are not credentials
    pub fn bearer(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Credential(token.trim().to_string()))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Read-only access to the current credential
pub trait CredentialSource: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

pub type CredentialRef = Arc<dyn CredentialSource>;

/// A credential fixed at construction
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(credential: Option<Credential>) -> Self {
        StaticCredential(credential)
    }

    /// From a raw token, if any
    pub fn from_token(token: Option<String>) -> Self {
        StaticCredential(token.and_then(Credential::bearer))
    }

    pub fn none() -> Self {
        StaticCredential(None)
    }
}

impl CredentialSource for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

/// A credential slot owned by the login flow and shared with stores
#[derive(Debug, Default)]
pub struct SessionCredential {
    slot: RwLock<Option<Credential>>,
}

impl SessionCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, credential: Credential) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialSource for SessionCredential {
    fn credential(&self) -> Option<Credential> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_not_a_credential() {
        assert!(Credential::bearer("").is_none());
        assert!(Credential::bearer("   ").is_none());
        assert_eq!(Credential::bearer(" abc ").unwrap().token(), "abc");
    }

    #[test]
    fn test_header_value() {
        let credential = Credential::bearer("tok-1").unwrap();
        assert_eq!(credential.header_value(), "Bearer tok-1");
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::bearer("secret-token").unwrap();
        assert!(!format!("{:?}", credential).contains("secret"));
    }

    #[test]
    fn test_static_credential() {
        assert!(StaticCredential::none().credential().is_none());
        assert!(StaticCredential::from_token(Some(String::new())).credential().is_none());
        assert!(StaticCredential::from_token(Some("t".to_string())).credential().is_some());
    }

    #[test]
    fn test_session_credential_set_and_clear() {
        let session = SessionCredential::new();
        assert!(session.credential().is_none());
        session.set(Credential::bearer("t").unwrap());
        assert_eq!(session.credential().unwrap().token(), "t");
        session.clear();
        assert!(session.credential().is_none());
    }
}
