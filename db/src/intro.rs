use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Error;
use abi::model::{IntroRequest, NewIntroRequest, Progress};

#[async_trait]
pub trait IntroRequestRepo: Send + Sync + Debug {
    /// store a new pending request; a second live request for the same
    /// ordered pair fails with `DuplicateRequest`
    async fn create(&self, req: NewIntroRequest) -> Result<IntroRequest, Error>;

    async fn get(&self, id: &str) -> Result<Option<IntroRequest>, Error>;

    /// most recent request from `from_user_id` to `to_user_id`, any status
    async fn find_between(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<IntroRequest>, Error>;

    /// Move the request from `expected` to `next` if it is still at `expected`.
    /// Returns `None` when another writer got there first.
    /// When `next` is approved the friendship edge between requester and
    /// target is added in the same atomic unit.
    async fn advance(
        &self,
        id: &str,
        expected: Progress,
        next: Progress,
    ) -> Result<Option<IntroRequest>, Error>;

    /// requests the user has to act on right now, newest first
    async fn list_received(&self, user_id: &str) -> Result<Vec<IntroRequest>, Error>;

    /// requests the user submitted, newest first
    async fn list_sent(&self, user_id: &str) -> Result<Vec<IntroRequest>, Error>;
}
