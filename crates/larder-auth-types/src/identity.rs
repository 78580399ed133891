//! Gateway-injected identity.
//!
//! The gateway authenticates the caller and forwards the result as two headers. Anything
//! missing or malformed in them is treated as an unauthenticated request.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, StatusCode};

pub const USER_ID_HEADER: &str = "x-larder-user-id";
pub const USER_ROLE_HEADER: &str = "x-larder-user-role";

/// Caller identity read from `x-larder-user-id` and `x-larder-user-role`.
///
/// Rejects with 401. Role checks beyond that belong to the use cases.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user_id: i64,
    pub user_role: u8,
}

fn header_value<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

impl IdentityHeaders {
    /// `None` unless both headers parse and the user id is positive.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = header_value::<i64>(headers, USER_ID_HEADER).filter(|id| *id > 0)?;
        let user_role = header_value::<u8>(headers, USER_ROLE_HEADER)?;
        Some(Self { user_id, user_role })
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        std::future::ready(Self::from_headers(&parts.headers).ok_or(StatusCode::UNAUTHORIZED))
    }
}
