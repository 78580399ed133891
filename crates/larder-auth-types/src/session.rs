//! Active-household session slot.
//!
//! The household a user last worked in is remembered in a cookie so that requests
//! without an explicit `x-household-id` header land in the same household.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Request header that selects a household for a single request.
pub const HOUSEHOLD_SELECTOR_HEADER: &str = "x-household-id";

/// Cookie name for the remembered household id.
pub const ACTIVE_HOUSEHOLD_COOKIE: &str = "active_household_id";

/// Cookie Max-Age in seconds (30 days).
pub const ACTIVE_HOUSEHOLD_MAX_AGE: i64 = 2_592_000;

/// Read the remembered household id. Unparsable or non-positive values read as absent.
///
/// ```
/// use axum_extra::extract::cookie::{Cookie, CookieJar};
/// use larder_auth_types::session::{active_household, ACTIVE_HOUSEHOLD_COOKIE};
///
/// let jar = CookieJar::new().add(Cookie::new(ACTIVE_HOUSEHOLD_COOKIE, "12"));
/// assert_eq!(active_household(&jar), Some(12));
///
/// let jar = CookieJar::new().add(Cookie::new(ACTIVE_HOUSEHOLD_COOKIE, "nope"));
/// assert_eq!(active_household(&jar), None);
/// ```
pub fn active_household(jar: &CookieJar) -> Option<i64> {
    jar.get(ACTIVE_HOUSEHOLD_COOKIE)
        .and_then(|c| c.value().trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

/// Remember `household_id` as the active household.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use larder_auth_types::session::{
///     set_active_household_cookie, ACTIVE_HOUSEHOLD_COOKIE, ACTIVE_HOUSEHOLD_MAX_AGE,
/// };
///
/// let jar = set_active_household_cookie(CookieJar::new(), 7, "example.com".to_string());
/// let cookie = jar.get(ACTIVE_HOUSEHOLD_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "7");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(ACTIVE_HOUSEHOLD_MAX_AGE)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_active_household_cookie(jar: CookieJar, household_id: i64, domain: String) -> CookieJar {
    let cookie = Cookie::build((ACTIVE_HOUSEHOLD_COOKIE, household_id.to_string()))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(ACTIVE_HOUSEHOLD_MAX_AGE))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Forget the active household by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use larder_auth_types::session::{
///     clear_active_household_cookie, set_active_household_cookie, ACTIVE_HOUSEHOLD_COOKIE,
/// };
///
/// let jar = set_active_household_cookie(CookieJar::new(), 7, "example.com".to_string());
/// let jar = clear_active_household_cookie(jar, "example.com".to_string());
/// let cookie = jar.get(ACTIVE_HOUSEHOLD_COOKIE).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_active_household_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((ACTIVE_HOUSEHOLD_COOKIE, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
