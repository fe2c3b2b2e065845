//! Header manipulation toward upstreams.
//!
//! # Responsibilities
//! - Strip `Host` and `Content-Length`; the client connection regenerates them
//! - Strip any caller-supplied identity headers
//! - Inject verified identity headers (the trust boundary)
//!
//! # Design Decisions
//! - Upstreams learn who the caller is only from gateway-set headers
//! - Everything else is relayed verbatim

use axum::http::{
    header::{CONTENT_LENGTH, HOST},
    HeaderMap, HeaderName, HeaderValue,
};

use crate::security::access_control::AuthContext;

/// Verified subject id forwarded upstream.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-fleetbite-user-id");

/// Comma-joined verified roles forwarded upstream.
pub const USER_ROLES_HEADER: HeaderName = HeaderName::from_static("x-fleetbite-user-roles");

/// Fields the gateway never relays as-is.
const STRIPPED: [HeaderName; 4] = [HOST, CONTENT_LENGTH, USER_ID_HEADER, USER_ROLES_HEADER];

/// Build the header map sent upstream.
pub fn upstream_headers(inbound: &HeaderMap, identity: Option<&AuthContext>) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in &STRIPPED {
        headers.remove(name);
    }

    if let Some(ctx) = identity {
        inject_identity(&mut headers, ctx);
    }
    headers
}

fn inject_identity(headers: &mut HeaderMap, ctx: &AuthContext) {
    let Some(subject) = ctx.subject() else {
        return;
    };

    match (
        HeaderValue::from_str(subject),
        HeaderValue::from_str(&ctx.roles.join(",")),
    ) {
        (Ok(user_id), Ok(roles)) => {
            headers.insert(USER_ID_HEADER, user_id);
            headers.insert(USER_ROLES_HEADER, roles);
        }
        _ => {
            tracing::warn!(subject = %subject, "Identity claims are not valid header values; not forwarded");
        }
    }
}
