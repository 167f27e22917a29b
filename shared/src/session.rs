//! Session credentials for backend calls.
//!
//! Sessions are issued elsewhere (the web sign-in flow); this module only hands
//! out the bearer token, and reports `None` when there is no usable one.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::inspect_token;
use crate::Config;

/// Bearer credential sent with every backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of bearer credentials.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current credential, or `None` when none can be obtained.
    async fn credential(&self) -> Option<Credential>;
}

/// Expiry of `token` if it is a readable JWT. `Err(())` when it has already expired.
fn token_expiry(token: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, ()> {
    match inspect_token(token) {
        Ok(user) if user.is_expired(now) => {
            warn!("Session token for {} expired at {:?}", user.user_id, user.expires_at);
            Err(())
        }
        Ok(user) => Ok(user.expires_at),
        Err(e) => {
            debug!("Treating session token as opaque: {}", e);
            Ok(None)
        }
    }
}

/// Fixed token, typically from `SESSION_TOKEN`.
pub struct StaticSession {
    token: Option<Credential>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(Credential::new),
        }
    }

    /// A session that never yields a credential.
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn credential(&self) -> Option<Credential> {
        let credential = self.token.as_ref()?;
        token_expiry(credential.as_str(), Utc::now()).ok()?;
        Some(credential.clone())
    }
}

struct CachedToken {
    credential: Credential,
    expires_at: Option<DateTime<Utc>>,
}

/// Token read from a file that the sign-in flow keeps fresh.
///
/// The token is cached until its `exp` claim passes, then the file is read again.
pub struct TokenFileSession {
    path: PathBuf,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenFileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call re-reads the file.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}

#[async_trait]
impl SessionProvider for TokenFileSession {
    async fn credential(&self) -> Option<Credential> {
        let now = Utc::now();

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at.map_or(true, |exp| exp > now) {
                    return Some(cached.credential.clone());
                }
            }
        }

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read session token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let token = contents.trim();
        if token.is_empty() {
            warn!("Session token file {} is empty", self.path.display());
            return None;
        }

        let expires_at = token_expiry(token, now).ok()?;
        let credential = Credential::new(token);

        // Cache the result
        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedToken {
                credential: credential.clone(),
                expires_at,
            });
        }

        Some(credential)
    }
}

/// Pick the session provider described by `config`. A token file wins over a static token.
pub fn from_config(config: &Config) -> Arc<dyn SessionProvider> {
    match &config.session_token_file {
        Some(path) => Arc::new(TokenFileSession::new(path.clone())),
        None => Arc::new(StaticSession::new(config.session_token.clone())),
    }
}
