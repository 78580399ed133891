use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// JSON error body shared by every service.
///
/// Serialized as `{"kind": "SCREAMING_SNAKE", "message": "..."}`; field-level validation
/// failures add an `errors` object keyed by field path.
#[derive(Debug)]
pub struct ErrorBody {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub errors: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for ErrorBody {
    // Logging stays with the caller, which still holds the underlying error.
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "kind": self.kind,
            "message": self.message,
        });
        if let Some(errors) = self.errors {
            body["errors"] = errors;
        }
        (self.status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_render_kind_and_message() {
        let resp = ErrorBody::new(StatusCode::NOT_FOUND, "RECIPE_NOT_FOUND", "recipe not found")
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "RECIPE_NOT_FOUND");
        assert_eq!(json["message"], "recipe not found");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn should_attach_field_errors() {
        let resp = ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            "the given data was invalid",
        )
        .with_errors(serde_json::json!({ "title": ["title is required"] }))
        .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["errors"]["title"][0], "title is required");
    }

    #[tokio::test]
    async fn should_render_internal_errors() {
        let resp = ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "internal error")
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["kind"], "INTERNAL");
    }
}
