/**
 * JSON Body Extractor
 *
 * `JsonBody<T>` deserializes the request body like `axum::Json`, but a body
 * that fails to parse is rejected with a `BackendError`, so the client gets
 * the usual `{"error", "status"}` response.
 */
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;

/// Request body deserialized from JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
