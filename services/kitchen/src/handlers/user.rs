use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use larder_auth_types::identity::IdentityHeaders;

use crate::domain::types::User;
use crate::error::KitchenServiceError;
use crate::state::AppState;
use crate::usecase::user::{CreateUserInput, CreateUserUseCase, GetUserUseCase};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: u8,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "larder_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: Option<u8>,
}

pub async fn create_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), KitchenServiceError> {
    let usecase = CreateUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.user_role,
            CreateUserInput {
                name: body.name,
                email: body.email,
                role: body.role.unwrap_or(0),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, KitchenServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}
