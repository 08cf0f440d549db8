//! Authenticated session state, persisted per role.
//!
//! Explicitly constructed and injected (no process-wide singleton): built
//! at startup from the persisted token, torn down on logout. The token is
//! stored as `{ "token": ... }` under a role-scoped key; at bootstrap the
//! JWT `exp` claim is checked client-side and stale or malformed tokens
//! are discarded (fail-closed).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::{AuthGateway, AuthToken, GatewayError, Role};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Reads the `exp` claim (seconds since epoch) from an unverified JWT.
/// Signature verification belongs to the backend; this peek only decides
/// whether a persisted token is worth presenting at all.
pub fn token_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let claims_segment = raw.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(claims_segment).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

/// File-backed token persistence, one JSON file per role-scoped key.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn save(&self, key: &str, token: &AuthToken) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), serde_json::to_vec(token)?)?;
        Ok(())
    }

    pub fn load(&self, key: &str) -> Result<Option<AuthToken>, SessionError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    pub fn clear(&self, key: &str) -> Result<(), SessionError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// In-memory authenticated state for one portal role.
pub struct AuthSession {
    store: TokenStore,
    role: Role,
    token: Option<AuthToken>,
}

impl AuthSession {
    /// Seeds the session from the persisted token, dropping it when the
    /// `exp` claim is past or unreadable.
    pub fn bootstrap(store: TokenStore, role: Role) -> Self {
        let key = role.auth_key();
        let token = match store.load(key) {
            Ok(Some(token)) => match token_expiry(&token.token) {
                Some(exp) if exp > Utc::now() => {
                    info!("Restored {key} session (expires {exp})");
                    Some(token)
                }
                Some(exp) => {
                    warn!("Persisted {key} token expired at {exp}; discarding");
                    let _ = store.clear(key);
                    None
                }
                None => {
                    warn!("Persisted {key} token has no readable exp claim; discarding");
                    let _ = store.clear(key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read persisted {key} token: {e}; discarding");
                let _ = store.clear(key);
                None
            }
        };
        Self { store, role, token }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Authenticates against the gateway and persists the issued token.
    pub async fn login(
        &mut self,
        gateway: &dyn AuthGateway,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let token = gateway.login(email, password).await?;
        self.adopt(token)
    }

    /// Stores a token issued outside login (e.g. by a completed signup).
    pub fn adopt(&mut self, token: AuthToken) -> Result<(), SessionError> {
        self.store.save(self.role.auth_key(), &token)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.token = None;
        self.store.clear(self.role.auth_key())?;
        info!("Logged out of {} session", self.role.auth_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unsigned JWT-shaped token with the given claims object.
    fn fake_jwt(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn test_token_expiry_reads_exp_claim() {
        let token = fake_jwt(serde_json::json!({"sub": "u1", "exp": 1_900_000_000}));
        let exp = token_expiry(&token).unwrap();
        assert_eq!(exp.timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_token_expiry_none_for_garbage() {
        assert!(token_expiry("not-a-jwt").is_none());
        assert!(token_expiry("a.b.c").is_none());
        let no_exp = fake_jwt(serde_json::json!({"sub": "u1"}));
        assert!(token_expiry(&no_exp).is_none());
    }

    #[test]
    fn test_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        let token = AuthToken {
            token: "abc".into(),
        };
        store.save("job-seeker-auth", &token).unwrap();
        let loaded = store.load("job-seeker-auth").unwrap().unwrap();
        assert_eq!(loaded.token, "abc");
        store.clear("job-seeker-auth").unwrap();
        assert!(store.load("job-seeker-auth").unwrap().is_none());
    }

    #[test]
    fn test_bootstrap_restores_unexpired_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        let future = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = AuthToken {
            token: fake_jwt(serde_json::json!({"exp": future})),
        };
        store.save("business-auth", &token).unwrap();

        let session = AuthSession::bootstrap(store, Role::Business);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_bootstrap_discards_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        let past = (Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = AuthToken {
            token: fake_jwt(serde_json::json!({"exp": past})),
        };
        store.save("business-auth", &token).unwrap();

        let session = AuthSession::bootstrap(store.clone(), Role::Business);
        assert!(!session.is_authenticated());
        // the stale file is gone too
        assert!(store.load("business-auth").unwrap().is_none());
    }

    #[test]
    fn test_bootstrap_discards_malformed_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        let token = AuthToken {
            token: "opaque-not-a-jwt".into(),
        };
        store.save("job-seeker-auth", &token).unwrap();

        let session = AuthSession::bootstrap(store, Role::JobSeeker);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_clears_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());
        let future = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let mut session = AuthSession::bootstrap(store.clone(), Role::JobSeeker);
        session
            .adopt(AuthToken {
                token: fake_jwt(serde_json::json!({"exp": future})),
            })
            .unwrap();
        assert!(session.is_authenticated());

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(store.load("job-seeker-auth").unwrap().is_none());
    }
}
