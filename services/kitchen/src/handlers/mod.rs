use serde::de::DeserializeOwned;

use crate::error::KitchenServiceError;

pub mod catalog;
pub mod household;
pub mod inventory;
pub mod invite;
pub mod membership;
pub mod recipe;
pub mod tag;
pub mod user;

/// Parse a raw query string with `serde_qs`, so `tags[]=a&tags[]=b` arrays work.
/// A missing query string yields the type's default.
pub(crate) fn parse_query<T>(raw_query: Option<String>) -> Result<T, KitchenServiceError>
where
    T: DeserializeOwned + Default,
{
    raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| KitchenServiceError::MissingData)
        .map(Option::unwrap_or_default)
}
