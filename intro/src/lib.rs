//! The introduction workflow and the friend-of-friend map on top of the
//! storage collaborators in `db`.
//!
//! Every operation takes the acting user explicitly; nothing here reads a
//! session.

mod graph;
mod users;
mod workflow;

use db::DbRepo;

pub use graph::derive_friends_of_friends;
pub use users::normalize_username;
pub use workflow::{next_progress, resolve_stage, Decision, Stage, SubmitRequest};

#[derive(Debug, Clone)]
pub struct IntroService {
    db: DbRepo,
}

impl IntroService {
    pub fn new(db: DbRepo) -> Self {
        Self { db }
    }

    /// service over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(DbRepo::memory())
    }
}
