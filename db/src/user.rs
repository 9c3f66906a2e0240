use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Error;
use abi::model::{NewUser, User, UserUpdate};

#[async_trait]
pub trait UserRepo: Sync + Send + Debug {
    /// create user; the username must be unused
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// get user by id
    async fn get_user(&self, id: &str) -> Result<Option<User>, Error>;

    /// get users by id, unknown ids are skipped
    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>, Error>;

    async fn update_profile(&self, id: &str, update: UserUpdate) -> Result<User, Error>;

    /// set the final username and freeze it
    async fn complete_onboarding(&self, id: &str, username: &str) -> Result<User, Error>;
}
