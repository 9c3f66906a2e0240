use abi::errors::Error;
use axum::{
    async_trait,
    extract::{path::ErrorKind, rejection::PathRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

// We define our own `Path` extractor that customizes the errors from `axum::extract::Path`
pub struct PathExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathExtractor<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let (status, body) = match rejection {
                    PathRejection::FailedToDeserializePathParams(inner) => {
                        let kind = inner.into_kind();
                        match &kind {
                            ErrorKind::ParseErrorAtKey { key, .. }
                            | ErrorKind::InvalidUtf8InPathParam { key } => (
                                StatusCode::BAD_REQUEST,
                                Error::path_parsing(format!("{}: {}", key, kind)),
                            ),
                            // an unsupported type is a bug in the handler, not the request
                            ErrorKind::UnsupportedType { .. } => (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Error::internal_with_details(kind.to_string()),
                            ),
                            _ => (StatusCode::BAD_REQUEST, Error::path_parsing(kind.to_string())),
                        }
                    }
                    PathRejection::MissingPathParams(error) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Error::path_parsing(error.to_string()),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Error::internal_with_details(format!(
                            "Unhandled path rejection: {rejection}"
                        )),
                    ),
                };

                Err((status, body))
            }
        }
    }
}
