use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub photo: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    /// username is frozen once this is set
    pub onboarded: bool,
    pub create_time: i64,
    pub update_time: i64,
}

impl User {
    /// name shown on the map, the username stands in for a blank name
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// sign-up payload handed over by the session collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub photo: Option<String>,
}

/// partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub photo: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if self.bio.is_some() {
            user.bio = self.bio;
        }
        if self.location.is_some() {
            user.location = self.location;
        }
        if self.photo.is_some() {
            user.photo = self.photo;
        }
        if self.twitter.is_some() {
            user.twitter = self.twitter;
        }
        if self.instagram.is_some() {
            user.instagram = self.instagram;
        }
        if self.linkedin.is_some() {
            user.linkedin = self.linkedin;
        }
    }
}
