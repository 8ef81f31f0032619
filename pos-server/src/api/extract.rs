//! Request extractors
//!
//! Same as [`axum::Json`], [`axum::extract::Path`] and [`axum::extract::Query`],
//! but a rejection is answered with the unified [`AppError`] shape instead of
//! axum's plain-text body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    let err = AppError::validation(format!("Invalid request body: {}", rejection.body_text()));
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            err.with_detail("reason", "missing_content_type")
        }
        JsonRejection::JsonSyntaxError(_) => err.with_detail("reason", "syntax"),
        JsonRejection::JsonDataError(_) => err.with_detail("reason", "schema"),
        _ => err,
    }
}

/// Path parameters, e.g. the `{id}` in `/api/orders/{id}`
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection_to_error(rejection)),
        }
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
    AppError::validation(format!("Invalid path parameter: {}", rejection.body_text()))
        .with_detail("reason", "path")
}

/// Query string
pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection_to_error(rejection)),
        }
    }
}

fn query_rejection_to_error(rejection: QueryRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected query string");
    AppError::validation(format!("Invalid query string: {}", rejection.body_text()))
        .with_detail("reason", "query")
}
