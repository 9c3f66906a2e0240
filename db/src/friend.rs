use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Error;

/// The symmetric friendship relation. Both directions of an edge are written
/// together, no reader ever sees one side without the other.
#[async_trait]
pub trait FriendRepo: Send + Sync + Debug {
    /// idempotent; fails with `UserNotFound` without touching either side
    async fn add_edge(&self, user_a: &str, user_b: &str) -> Result<(), Error>;

    /// removing an absent edge is a no-op
    async fn remove_edge(&self, user_a: &str, user_b: &str) -> Result<(), Error>;

    async fn are_friends(&self, user_a: &str, user_b: &str) -> Result<bool, Error>;

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>, Error>;

    /// friend sets of many users in one read; users without friends map to an empty list
    async fn friend_ids_of(&self, user_ids: &[String])
        -> Result<HashMap<String, Vec<String>>, Error>;
}
