//! Extractores de Axum
//!
//! Envuelven `Json`, `Query` y `Path` para que cualquier rechazo se
//! convierta en un `AppError` con cuerpo `{success:false, message}`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppError;

/// Body JSON deserializado y validado con `validator`
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Body JSON opcional: sin cuerpo se usa `T::default()`. Si llega algo, se
/// deserializa y valida igual que `ValidatedJson`.
#[derive(Debug)]
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("JSON inválido: {}", e)))?;
        value.validate()?;
        Ok(OptionalJson(value))
    }
}

/// Query string deserializada; errores → 400
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Identificador UUID del path (`/:id`); un id mal formado → 400
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        Uuid::parse_str(&raw)
            .map(IdPath)
            .map_err(|_| AppError::BadRequest(format!("ID inválido: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::patch,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Default, Deserialize, Validate)]
    struct NoteRequest {
        #[validate(length(max = 5))]
        note: Option<String>,
    }

    fn router() -> Router {
        Router::new().route(
            "/",
            patch(|OptionalJson(request): OptionalJson<NoteRequest>| async move {
                request.note.unwrap_or_else(|| "sin nota".to_string())
            }),
        )
    }

    async fn call(body: Body, content_type: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().method("PATCH").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let response = router().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_optional_json_without_body_uses_default() {
        assert_eq!(call(Body::empty(), None).await, (StatusCode::OK, "sin nota".to_string()));
        assert_eq!(
            call(Body::empty(), Some("application/json")).await,
            (StatusCode::OK, "sin nota".to_string())
        );
    }

    #[tokio::test]
    async fn test_optional_json_parses_and_validates_body() {
        let (status, body) = call(Body::from(r#"{"note":"ok"}"#), Some("application/json")).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));

        let (status, _) = call(Body::from(r#"{"note":"demasiado larga"}"#), Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(Body::from("{\"note\":"), Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
