use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderName;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::clock::Clock;
use crate::error::ApiError;

/// Header carrying a replacement for the current time, in milliseconds since the epoch.
pub static NOW_OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-test-now-ms");

/// Extractor that deserializes a JSON body and validates it.
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// The current time for this request, in milliseconds since the epoch.
///
/// Taken from the `x-test-now-ms` header when present, and from the app clock otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Now
where
    Arc<dyn Clock>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(&NOW_OVERRIDE_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .map(Now)
                .ok_or(ApiError::InvalidClockOverride),
            None => Ok(Now(Arc::<dyn Clock>::from_ref(state).now_ms())),
        }
    }
}
