use sqlx::error::{DatabaseError, ErrorKind as DbErrorKind};

/// partial unique index guarding one pending request per ordered pair
pub const LIVE_PAIR_CONSTRAINT: &str = "intro_requests_live_pair";
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Constraint violations the schema uses to serialize concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    LivePair,
    Username,
    MissingUser,
    None,
}

impl Conflict {
    pub fn classify(err: &dyn DatabaseError) -> Self {
        Self::from_parts(err.kind(), err.constraint())
    }

    pub fn from_parts(kind: DbErrorKind, constraint: Option<&str>) -> Self {
        match (kind, constraint) {
            (DbErrorKind::UniqueViolation, Some(LIVE_PAIR_CONSTRAINT)) => Conflict::LivePair,
            (DbErrorKind::UniqueViolation, Some(USERNAME_CONSTRAINT)) => Conflict::Username,
            (DbErrorKind::ForeignKeyViolation, _) => Conflict::MissingUser,
            _ => Conflict::None,
        }
    }
}
