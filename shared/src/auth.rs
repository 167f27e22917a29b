//! Bearer token inspection.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// JWT claims issued by the session provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// User information decoded from a session token.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: String,
    pub session_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionUser {
    /// Tokens without an `exp` claim never expire locally.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl TryFrom<SessionClaims> for SessionUser {
    type Error = Error;

    fn try_from(claims: SessionClaims) -> Result<Self> {
        if claims.sub.trim().is_empty() {
            return Err(Error::Auth("Token has an empty sub claim".to_string()));
        }

        let expires_at = match claims.exp {
            Some(exp) => Some(
                DateTime::from_timestamp(exp, 0)
                    .ok_or_else(|| Error::Auth(format!("Invalid exp claim: {}", exp)))?,
            ),
            None => None,
        };

        Ok(Self {
            user_id: claims.sub,
            session_id: claims.sid,
            expires_at,
        })
    }
}

/// Decode a session token and extract user information.
///
/// The backend verifies signatures; locally the claims are only read to learn
/// who the token belongs to and when it stops being worth sending.
pub fn inspect_token(token: &str) -> Result<SessionUser> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let key = DecodingKey::from_secret(b"unused");

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| Error::Auth(format!("Failed to decode token: {}", e)))?;

    SessionUser::try_from(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(claims: &SessionClaims) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(b"test")).unwrap()
    }

    #[test]
    fn test_inspect_token() {
        let exp = Utc::now() + Duration::minutes(5);
        let token = token_for(&SessionClaims {
            sub: "user_2abc".to_string(),
            exp: Some(exp.timestamp()),
            iat: None,
            iss: Some("https://clerk.example.com".to_string()),
            sid: Some("sess_1".to_string()),
        });

        let user = inspect_token(&format!("Bearer {}", token)).unwrap();
        assert_eq!(user.user_id, "user_2abc");
        assert_eq!(user.session_id.as_deref(), Some("sess_1"));
        assert!(!user.is_expired(Utc::now()));
        assert!(user.is_expired(exp + Duration::seconds(1)));
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let token = token_for(&SessionClaims {
            sub: "user_2abc".to_string(),
            exp: None,
            iat: None,
            iss: None,
            sid: None,
        });

        let user = inspect_token(&token).unwrap();
        assert!(user.expires_at.is_none());
        assert!(!user.is_expired(Utc::now()));
    }

    #[test]
    fn test_opaque_token_is_rejected() {
        assert!(matches!(inspect_token("not-a-jwt"), Err(Error::Auth(_))));
    }
}
