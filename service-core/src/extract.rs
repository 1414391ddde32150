//! Request extractors shared by the HTTP services.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized and passed `Validate`.
///
/// Unlike the plain `Json` extractor, every rejection (bad content type,
/// syntax error, wrong field type, failed validation) becomes a 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejected JSON body");
            AppError::BadRequest(anyhow::anyhow!(e.body_text()))
        })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    async fn echo(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.name
    }

    async fn send(body: &'static str) -> StatusCode {
        let app = Router::new().route("/", post(echo));
        app.oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        assert_eq!(send(r#"{"name":"rent"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn syntax_error_is_bad_request() {
        assert_eq!(send(r#"{"name":"#).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_type_is_bad_request() {
        assert_eq!(send(r#"{"name":42}"#).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_validation_is_bad_request() {
        assert_eq!(send(r#"{"name":""}"#).await, StatusCode::BAD_REQUEST);
    }
}
