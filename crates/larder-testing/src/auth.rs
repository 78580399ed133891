//! Mock auth helpers for tests.
//!
//! Services behind the gateway receive `x-larder-user-id` + `x-larder-user-role` headers
//! injected by the gateway. In tests, `MockAuth` builds these headers directly, optionally
//! with a household selector or a remembered active household cookie.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use larder_auth_types::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use larder_auth_types::session::{ACTIVE_HOUSEHOLD_COOKIE, HOUSEHOLD_SELECTOR_HEADER};

/// Configurable identity injected into test requests.
#[derive(Debug, Clone)]
pub struct MockAuth {
    pub user_id: i64,
    pub user_role: u8,
    pub selector: Option<String>,
    pub session_household: Option<i64>,
}

impl MockAuth {
    pub fn new(user_id: i64, user_role: u8) -> Self {
        Self {
            user_id,
            user_role,
            selector: None,
            session_household: None,
        }
    }

    /// Send `x-household-id` with the given raw value.
    pub fn selecting(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Send the active-household cookie.
    pub fn with_session_household(mut self, household_id: i64) -> Self {
        self.session_household = Some(household_id);
        self
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from(self.user_id),
        );
        map.insert(
            HeaderName::from_static(USER_ROLE_HEADER),
            HeaderValue::from(u16::from(self.user_role)),
        );
        if let Some(selector) = &self.selector {
            map.insert(
                HeaderName::from_static(HOUSEHOLD_SELECTOR_HEADER),
                HeaderValue::from_str(selector).expect("selector must be a valid header value"),
            );
        }
        if let Some(household_id) = self.session_household {
            let cookie = format!("{ACTIVE_HOUSEHOLD_COOKIE}={household_id}");
            map.insert(
                header::COOKIE,
                HeaderValue::from_str(&cookie).expect("cookie must be a valid header value"),
            );
        }
        map
    }
}
