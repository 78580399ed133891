use crate::domain::types::DEFAULT_INVITE_TTL_DAYS;

/// Longest invite lifetime accepted from the environment.
pub const MAX_INVITE_TTL_DAYS: i64 = 365;

/// Kitchen service configuration loaded from environment variables.
#[derive(Debug)]
pub struct KitchenConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `KITCHEN_PORT`.
    pub kitchen_port: u16,
    /// Domain attribute of the session cookie. Env var: `COOKIE_DOMAIN`.
    pub cookie_domain: String,
    /// Invite lifetime in days (default 7, at most 365). Env var: `INVITE_TTL_DAYS`.
    pub invite_ttl_days: i64,
}

impl KitchenConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            kitchen_port: std::env::var("KITCHEN_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            invite_ttl_days: invite_ttl_days(std::env::var("INVITE_TTL_DAYS").ok().as_deref()),
        }
    }
}

/// Unset, unparsable or non-positive values use the default; large ones are capped.
fn invite_ttl_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|days| *days > 0)
        .map_or(DEFAULT_INVITE_TTL_DAYS, |days| days.min(MAX_INVITE_TTL_DAYS))
}
