//! Signed bearer token handling.
//!
//! Verification uses one symmetric secret and exactly one algorithm; a token
//! signed with any other algorithm is rejected. Issuing exists for the
//! operator CLI and tests.

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Claims the gateway reads from a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user ID forwarded upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// User roles. Missing and `null` both mean no roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Claims {
    /// Claims for `subject` expiring `ttl` from now.
    pub fn new(subject: impl Into<String>, roles: Vec<String>, ttl: Duration) -> Self {
        let now = unix_now();
        Self {
            sub: Some(subject.into()),
            exp: Some(now + ttl.as_secs()),
            iat: Some(now),
            roles: Some(roles),
        }
    }

    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }
}

/// Why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    /// Any structural, signature or claim failure. The detail is for logs only.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
}

fn parse_algorithm(name: &str) -> Result<Algorithm, TokenError> {
    match Algorithm::from_str(name) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(TokenError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Verifies signature and expiry of bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_nbf = true;
        // `exp` is checked when present but not demanded.
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        Ok(Self::new(config.secret.as_bytes(), algorithm))
    }

    /// Decode `token` and check its signature and time claims against now.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

/// Signs tokens with the gateway secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        Ok(Self::new(
            config.secret.as_bytes(),
            algorithm,
            Duration::from_secs(config.token_expiry_secs),
        ))
    }

    /// Token for `subject` with the configured lifetime.
    pub fn issue(&self, subject: &str, roles: Vec<String>) -> Result<String, TokenError> {
        self.sign(&Claims::new(subject, roles, self.ttl))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
