use tracing::{debug, info};

use abi::errors::{Error, Result};
use abi::model::{NewUser, User, UserUpdate};

use crate::IntroService;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;

/// lowercase the username and check it is 3 to 30 chars of `[a-z0-9_]`
pub fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_lowercase();
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(Error::bad_request(format!(
            "username must be {} to {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(Error::bad_request(
            "username may only contain letters, digits and underscores",
        ));
    }
    Ok(username)
}

impl IntroService {
    pub async fn create_user(&self, mut user: NewUser) -> Result<User> {
        user.username = normalize_username(&user.username)?;
        let created = self.db.user.create_user(user).await?;
        info!("user {} created as {}", created.id, created.username);
        Ok(created)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.require_user(user_id).await
    }

    pub async fn update_profile(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        debug!("update profile of {}", user_id);
        self.db.user.update_profile(user_id, update).await
    }

    /// set the final username; only once per user
    pub async fn complete_onboarding(&self, user_id: &str, username: &str) -> Result<User> {
        let username = normalize_username(username)?;
        let user = self.db.user.complete_onboarding(user_id, &username).await?;
        info!("user {} onboarded as {}", user.id, user.username);
        Ok(user)
    }
}
