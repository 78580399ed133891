use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use larder_core::error::ErrorBody;

use crate::domain::validation::ValidationErrors;

/// Kitchen service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum KitchenServiceError {
    #[error("the given data was invalid")]
    Validation(ValidationErrors),

    #[error("invalid household context")]
    InvalidHouseholdContext,
    #[error("select a household first")]
    HouseholdRequired,
    #[error("you are not a member of this household")]
    NotHouseholdMember,
    #[error("only household owners and admins can do this")]
    NotHouseholdManager,
    #[error("this invite was sent to a different email address")]
    InviteEmailMismatch,
    #[error("forbidden")]
    Forbidden,

    #[error("user not found")]
    UserNotFound,
    #[error("household not found")]
    HouseholdNotFound,
    #[error("membership not found")]
    MembershipNotFound,
    #[error("invite not found")]
    InviteNotFound,
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("inventory item not found")]
    InventoryItemNotFound,

    #[error("household is not accepting new members")]
    HouseholdClosed,
    #[error("the household owner cannot be removed")]
    CannotRemoveOwner,
    #[error("invite has expired")]
    InviteExpired,
    #[error("only pending requests can be reviewed")]
    MembershipNotPending,
    #[error("user is already a household member")]
    AlreadyMember,
    #[error("only the household owner can do this")]
    HouseholdOwnerOnly,

    #[error("user already exists")]
    UserAlreadyExists,
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl KitchenServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidHouseholdContext => "INVALID_HOUSEHOLD_CONTEXT",
            Self::HouseholdRequired => "HOUSEHOLD_REQUIRED",
            Self::NotHouseholdMember => "NOT_HOUSEHOLD_MEMBER",
            Self::NotHouseholdManager => "NOT_HOUSEHOLD_MANAGER",
            Self::InviteEmailMismatch => "INVITE_EMAIL_MISMATCH",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::HouseholdNotFound => "HOUSEHOLD_NOT_FOUND",
            Self::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            Self::InviteNotFound => "INVITE_NOT_FOUND",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::InventoryItemNotFound => "INVENTORY_ITEM_NOT_FOUND",
            Self::HouseholdClosed => "HOUSEHOLD_CLOSED",
            Self::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::MembershipNotPending => "MEMBERSHIP_NOT_PENDING",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::HouseholdOwnerOnly => "HOUSEHOLD_OWNER_ONLY",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::HouseholdRequired
            | Self::HouseholdClosed
            | Self::CannotRemoveOwner
            | Self::InviteExpired
            | Self::MembershipNotPending
            | Self::AlreadyMember
            | Self::HouseholdOwnerOnly => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidHouseholdContext
            | Self::NotHouseholdMember
            | Self::NotHouseholdManager
            | Self::InviteEmailMismatch
            | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::HouseholdNotFound
            | Self::MembershipNotFound
            | Self::InviteNotFound
            | Self::RecipeNotFound
            | Self::IngredientNotFound
            | Self::ProductNotFound
            | Self::InventoryItemNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::MissingData => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for KitchenServiceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = ErrorBody::new(self.status(), self.kind(), self.to_string());
        match self {
            Self::Validation(errors) => body
                .with_errors(serde_json::to_value(errors).unwrap_or_default())
                .into_response(),
            _ => body.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    async fn assert_error(
        error: KitchenServiceError,
        expected_status: StatusCode,
        expected_kind: &str,
        expected_message: &str,
    ) -> serde_json::Value {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert_eq!(json["message"], expected_message);
        json
    }

    #[tokio::test]
    async fn should_return_validation_error_with_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "ingredients.0",
            "Each ingredient row must include ingredient_id, ingredient_slug, or ingredient_text.",
        );
        let json = assert_error(
            KitchenServiceError::Validation(errors),
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            "the given data was invalid",
        )
        .await;
        assert!(json["errors"]["ingredients.0"].is_array());
    }

    #[tokio::test]
    async fn should_return_invalid_household_context() {
        assert_error(
            KitchenServiceError::InvalidHouseholdContext,
            StatusCode::FORBIDDEN,
            "INVALID_HOUSEHOLD_CONTEXT",
            "invalid household context",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_household_required() {
        assert_error(
            KitchenServiceError::HouseholdRequired,
            StatusCode::UNPROCESSABLE_ENTITY,
            "HOUSEHOLD_REQUIRED",
            "select a household first",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_not_household_manager() {
        assert_error(
            KitchenServiceError::NotHouseholdManager,
            StatusCode::FORBIDDEN,
            "NOT_HOUSEHOLD_MANAGER",
            "only household owners and admins can do this",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invite_email_mismatch() {
        assert_error(
            KitchenServiceError::InviteEmailMismatch,
            StatusCode::FORBIDDEN,
            "INVITE_EMAIL_MISMATCH",
            "this invite was sent to a different email address",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_recipe_not_found() {
        assert_error(
            KitchenServiceError::RecipeNotFound,
            StatusCode::NOT_FOUND,
            "RECIPE_NOT_FOUND",
            "recipe not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invite_not_found() {
        assert_error(
            KitchenServiceError::InviteNotFound,
            StatusCode::NOT_FOUND,
            "INVITE_NOT_FOUND",
            "invite not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_household_closed() {
        assert_error(
            KitchenServiceError::HouseholdClosed,
            StatusCode::UNPROCESSABLE_ENTITY,
            "HOUSEHOLD_CLOSED",
            "household is not accepting new members",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_cannot_remove_owner() {
        assert_error(
            KitchenServiceError::CannotRemoveOwner,
            StatusCode::UNPROCESSABLE_ENTITY,
            "CANNOT_REMOVE_OWNER",
            "the household owner cannot be removed",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invite_expired() {
        assert_error(
            KitchenServiceError::InviteExpired,
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVITE_EXPIRED",
            "invite has expired",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_membership_not_pending() {
        assert_error(
            KitchenServiceError::MembershipNotPending,
            StatusCode::UNPROCESSABLE_ENTITY,
            "MEMBERSHIP_NOT_PENDING",
            "only pending requests can be reviewed",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_user_already_exists() {
        assert_error(
            KitchenServiceError::UserAlreadyExists,
            StatusCode::CONFLICT,
            "USER_ALREADY_EXISTS",
            "user already exists",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_missing_data() {
        assert_error(
            KitchenServiceError::MissingData,
            StatusCode::BAD_REQUEST,
            "MISSING_DATA",
            "missing data",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_internal() {
        assert_error(
            KitchenServiceError::Internal(anyhow::anyhow!("db error")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error",
        )
        .await;
    }
}
