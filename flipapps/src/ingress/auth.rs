//! Session tokens for the ingress service
//!
//! A client trades the shared password for an opaque token and presents
//! the token on every other call. Tokens expire after a fixed lifetime.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, error, info};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::time::Instant;

/// Random bytes per token
const TOKEN_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("incorrect password")]
    InvalidPassword,
    #[error("no token supplied")]
    MissingToken,
    #[error("unknown token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("no entropy available to mint a token")]
    Entropy,
}

/// Issues and checks access tokens
pub trait Authenticator: Send + Sync {
    /// Exchange the password for a fresh token
    fn authenticate(&self, password: &str) -> Result<String, AuthError>;

    /// Check that a token was issued and is still live
    fn verify(&self, token: &str) -> Result<(), AuthError>;
}

/// In-memory token store keyed by a shared password
pub struct SessionAuthenticator {
    password: String,
    expiry: Duration,
    tokens: Mutex<HashMap<String, Instant>>,
}

impl SessionAuthenticator {
    pub fn new(password: impl Into<String>, expiry: Duration) -> Self {
        Self {
            password: password.into(),
            expiry,
            tokens: Mutex::default(),
        }
    }

    /// Hex-encoded bytes from the OS random source
    fn mint() -> Result<String, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut bytes).map_err(|e| {
            error!("Failed to read random bytes: {}", e);
            AuthError::Entropy
        })?;
        Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // Token map stays consistent even if a holder panicked
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Authenticator for SessionAuthenticator {
    fn authenticate(&self, password: &str) -> Result<String, AuthError> {
        if !bool::from(password.as_bytes().ct_eq(self.password.as_bytes())) {
            info!("Rejected login with incorrect password");
            return Err(AuthError::InvalidPassword);
        }

        let token = Self::mint()?;
        let now = Instant::now();
        let mut tokens = self.tokens();
        tokens.retain(|_, expires| *expires > now);
        tokens.insert(token.clone(), now + self.expiry);
        debug!("Issued token, {} live", tokens.len());
        Ok(token)
    }

    fn verify(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut tokens = self.tokens();
        match tokens.get(token) {
            None => Err(AuthError::InvalidToken),
            Some(expires) if *expires <= Instant::now() => {
                tokens.remove(token);
                Err(AuthError::Expired)
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> SessionAuthenticator {
        SessionAuthenticator::new("hunter2", Duration::from_secs(60))
    }

    #[test]
    fn test_wrong_password() {
        assert_eq!(auth().authenticate("hunter3"), Err(AuthError::InvalidPassword));
        assert_eq!(auth().authenticate("hunter"), Err(AuthError::InvalidPassword));
        assert_eq!(auth().authenticate(""), Err(AuthError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let auth = auth();
        let token = auth.authenticate("hunter2").unwrap();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(auth.verify(&token), Ok(()));
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let auth = auth();
        let tokens: std::collections::HashSet<String> = (0..64)
            .map(|_| auth.authenticate("hunter2").unwrap())
            .collect();
        assert_eq!(tokens.len(), 64);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_tokens() {
        let auth = auth();
        assert_eq!(auth.verify(""), Err(AuthError::MissingToken));
        assert_eq!(auth.verify("deadbeef"), Err(AuthError::InvalidToken));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_expires() {
        let auth = auth();
        let token = auth.authenticate("hunter2").unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(auth.verify(&token), Ok(()));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(auth.verify(&token), Err(AuthError::Expired));
        // Purged after the first expired check
        assert_eq!(auth.verify(&token), Err(AuthError::InvalidToken));
    }
}
