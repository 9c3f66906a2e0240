use serde::{Deserialize, Serialize};

use crate::model::User;

/// a direct friend through whom a friend-of-friend is reachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub display_name: String,
    pub photo: Option<String>,
}

impl From<&User> for Connector {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name().to_string(),
            photo: user.photo.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendOfFriend {
    pub user: User,
    /// every direct friend connected to `user`, not just the first match
    pub mutual_connectors: Vec<Connector>,
}

/// what the map renders for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMap {
    pub user: User,
    pub friends: Vec<User>,
    pub friends_of_friends: Vec<FriendOfFriend>,
}
