//! Access control: bearer token gate with a path exclusion list.
//!
//! # Responsibilities
//! - Let excluded paths through without credentials
//! - Require `Authorization: Bearer <token>` everywhere else
//! - Verify the token and expose the caller identity as an `AuthContext`
//!
//! # Design Decisions
//! - Exclusions are full-path regex matches, kept apart from prefix routing
//! - Failure detail goes to logs; callers only see three generic messages
//! - Pure computation: no I/O, no suspension

use regex::Regex;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::observability::metrics;
use crate::security::tokens::{TokenError, TokenVerifier};

/// Exact, case-sensitive prefix of a bearer credential.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Compiled path patterns that bypass authentication.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Regex>,
}

impl ExclusionSet {
    /// Compile `patterns`; each must match the whole path to apply.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(&format!("^(?:{})$", p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

/// Why a request was refused by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Missing or malformed Authorization header")]
    MissingOrMalformedHeader,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

impl AuthFailure {
    /// Metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingOrMalformedHeader => "missing_header",
            AuthFailure::Expired => "expired",
            AuthFailure::Invalid => "invalid",
        }
    }
}

/// Verified caller identity for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// `sub` claim; tokens without one authenticate but carry no identity.
    pub subject_id: Option<String>,
    /// `roles` claim, empty when absent.
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn new(subject_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            roles,
        }
    }

    /// Subject to forward upstream, if there is a non-empty one.
    pub fn subject(&self) -> Option<&str> {
        self.subject_id.as_deref().filter(|s| !s.is_empty())
    }
}

/// Successful gate outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Path is excluded; no identity is attached.
    Excluded,
    /// Token verified.
    Authenticated(AuthContext),
}

impl AuthOutcome {
    pub fn context(&self) -> Option<&AuthContext> {
        match self {
            AuthOutcome::Excluded => None,
            AuthOutcome::Authenticated(ctx) => Some(ctx),
        }
    }
}

/// Bearer token verifier with a path exclusion list.
#[derive(Debug, Clone)]
pub struct AuthGate {
    exclusions: ExclusionSet,
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(exclusions: ExclusionSet, verifier: TokenVerifier) -> Self {
        Self {
            exclusions,
            verifier,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthSetupError> {
        Ok(Self::new(
            ExclusionSet::new(&config.excluded_paths)?,
            TokenVerifier::from_config(config)?,
        ))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.is_excluded(path)
    }

    /// Decide whether a request for `path` with the given `Authorization`
    /// header value may proceed.
    pub fn authenticate(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<AuthOutcome, AuthFailure> {
        if self.is_excluded(path) {
            return Ok(AuthOutcome::Excluded);
        }

        let result = self.verify_header(authorization);
        if let Err(failure) = &result {
            metrics::record_auth_failure(failure.reason());
        }
        result
    }

    fn verify_header(&self, authorization: Option<&str>) -> Result<AuthOutcome, AuthFailure> {
        let token = authorization
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthFailure::MissingOrMalformedHeader)?;

        match self.verifier.verify(token) {
            Ok(claims) => {
                let roles = claims.roles().to_vec();
                Ok(AuthOutcome::Authenticated(AuthContext {
                    subject_id: claims.sub,
                    roles,
                }))
            }
            Err(TokenError::Expired) => {
                tracing::info!("Token has expired");
                Err(AuthFailure::Expired)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid token");
                Err(AuthFailure::Invalid)
            }
        }
    }
}

/// Startup failure building the gate from configuration.
#[derive(Debug, Error)]
pub enum AuthSetupError {
    #[error("invalid excluded path pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Token(#[from] TokenError),
}
