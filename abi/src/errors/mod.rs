use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::error;

use crate::errors::conflict::Conflict;

pub mod conflict;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    // self-request, or an introduction without three distinct parties
    InvalidParticipants,
    AlreadyFriends,
    DuplicateRequest,
    NotFound,
    Forbidden,
    AlreadyProcessed,
    UserNotFound,
    UsernameTaken,
    UsernameLocked,

    DbError,
    ConfigReadError,
    ConfigParseError,
    IOError,
    BadRequest,
    BodyParsing,
    PathParsing,
    UnAuthorized,
    InternalServer,
}

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            details: None,
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            details: Some(details.into()),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    #[inline]
    pub fn invalid_participants(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InvalidParticipants, details)
    }

    #[inline]
    pub fn already_friends() -> Self {
        Self::with_kind(ErrorKind::AlreadyFriends)
    }

    #[inline]
    pub fn duplicate_request() -> Self {
        Self::with_kind(ErrorKind::DuplicateRequest)
    }

    #[inline]
    pub fn not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound)
    }

    #[inline]
    pub fn not_found_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Forbidden, details)
    }

    #[inline]
    pub fn already_processed() -> Self {
        Self::with_kind(ErrorKind::AlreadyProcessed)
    }

    #[inline]
    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UserNotFound, user_id)
    }

    #[inline]
    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UsernameTaken, username)
    }

    #[inline]
    pub fn username_locked() -> Self {
        Self::with_kind(ErrorKind::UsernameLocked)
    }

    #[inline]
    pub fn config_read(error: std::io::Error) -> Self {
        Self::new(ErrorKind::ConfigReadError, error.to_string(), error)
    }

    #[inline]
    pub fn internal(error: impl StdError + 'static + Send + Sync) -> Self {
        Self {
            kind: ErrorKind::InternalServer,
            details: Some(error.to_string()),
            source: Some(Box::new(error)),
        }
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InternalServer, details)
    }

    #[inline]
    pub fn unauthorized(
        error: impl StdError + 'static + Send + Sync,
        details: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnAuthorized, details, error)
    }

    #[inline]
    pub fn unauthorized_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UnAuthorized, details)
    }

    #[inline]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BadRequest, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }

    #[inline]
    pub fn path_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::PathParsing, details)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::InvalidParticipants
            | ErrorKind::BadRequest
            | ErrorKind::BodyParsing
            | ErrorKind::PathParsing => StatusCode::BAD_REQUEST,
            ErrorKind::UnAuthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound | ErrorKind::UserNotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyFriends
            | ErrorKind::DuplicateRequest
            | ErrorKind::AlreadyProcessed
            | ErrorKind::UsernameTaken
            | ErrorKind::UsernameLocked => StatusCode::CONFLICT,
            ErrorKind::DbError
            | ErrorKind::ConfigReadError
            | ErrorKind::ConfigParseError
            | ErrorKind::IOError
            | ErrorKind::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!("custom error to http error {:?}", self);
        }
        (status_code, Json(self)).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParseError, value.to_string(), value)
    }
}

// constraint violations carry domain meaning, everything else is a db error
impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        let conflict = match &value {
            sqlx::Error::Database(db_err) => Conflict::classify(db_err.as_ref()),
            _ => Conflict::None,
        };
        match conflict {
            Conflict::LivePair => Self::new(ErrorKind::DuplicateRequest, value.to_string(), value),
            Conflict::Username => Self::new(ErrorKind::UsernameTaken, value.to_string(), value),
            Conflict::MissingUser => Self::new(ErrorKind::UserNotFound, value.to_string(), value),
            Conflict::None => Self::new(ErrorKind::DbError, value.to_string(), value),
        }
    }
}
