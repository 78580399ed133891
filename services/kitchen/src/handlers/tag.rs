use axum::{
    Json,
    extract::{RawQuery, State},
};
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;

use crate::domain::types::Tag;
use crate::error::KitchenServiceError;
use crate::handlers::parse_query;
use crate::state::AppState;
use crate::usecase::catalog::{DEFAULT_CATALOG_LIMIT, catalog_search};
use crate::usecase::tag::SearchTagsUseCase;

#[derive(Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            slug: tag.slug,
            name: tag.name,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct TagSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
}

// ── GET /tags ────────────────────────────────────────────────────────────────

pub async fn search_tags(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<TagResponse>>, KitchenServiceError> {
    let query: TagSearchQuery = parse_query(raw_query)?;
    let search = catalog_search(query.q.as_deref(), query.limit, DEFAULT_CATALOG_LIMIT, false)?;
    let usecase = SearchTagsUseCase {
        repo: state.tag_repo(),
    };
    let tags = usecase.execute(search).await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}
