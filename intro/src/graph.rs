use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use abi::errors::{Error, Result};
use abi::model::{Connector, FriendOfFriend, SocialMap, User};

use crate::IntroService;

/// Friends of friends of `user_id` with every direct friend that connects them.
///
/// `direct` is the user's own friend set and `adjacency` maps each of those
/// friends to their friend set. Connector lists come back sorted by id.
pub fn derive_friends_of_friends(
    user_id: &str,
    direct: &[String],
    adjacency: &HashMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    let direct_set: HashSet<&str> = direct.iter().map(String::as_str).collect();
    let mut found: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for friend in direct {
        let Some(their_friends) = adjacency.get(friend) else {
            continue;
        };
        for candidate in their_friends {
            if candidate == user_id || direct_set.contains(candidate.as_str()) {
                continue;
            }
            let connectors = found.entry(candidate.clone()).or_default();
            if !connectors.contains(friend) {
                connectors.push(friend.clone());
            }
        }
    }

    for connectors in found.values_mut() {
        connectors.sort();
    }
    found
}

impl IntroService {
    pub async fn compute_friends_of_friends(&self, user_id: &str) -> Result<Vec<FriendOfFriend>> {
        self.require_user(user_id).await?;
        let direct = self.db.friend.friend_ids(user_id).await?;
        self.friends_of_friends(user_id, &direct).await
    }

    /// direct friends as full profiles, ordered by id
    pub async fn list_friends(&self, user_id: &str) -> Result<Vec<User>> {
        self.require_user(user_id).await?;
        let direct = self.db.friend.friend_ids(user_id).await?;
        self.profiles(&direct).await
    }

    pub async fn social_map(&self, user_id: &str) -> Result<SocialMap> {
        let user = self.require_user(user_id).await?;
        let direct = self.db.friend.friend_ids(user_id).await?;
        let friends = self.profiles(&direct).await?;
        let friends_of_friends = self.friends_of_friends(user_id, &direct).await?;
        debug!(
            "map for {}: {} friends, {} friends of friends",
            user_id,
            friends.len(),
            friends_of_friends.len()
        );
        Ok(SocialMap {
            user,
            friends,
            friends_of_friends,
        })
    }

    pub async fn add_friend_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        self.db.friend.add_edge(user_a, user_b).await?;
        info!("edge added: {} <-> {}", user_a, user_b);
        Ok(())
    }

    pub async fn remove_friend_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        self.db.friend.remove_edge(user_a, user_b).await?;
        info!("edge removed: {} <-> {}", user_a, user_b);
        Ok(())
    }

    async fn friends_of_friends(
        &self,
        user_id: &str,
        direct: &[String],
    ) -> Result<Vec<FriendOfFriend>> {
        if direct.is_empty() {
            return Ok(Vec::new());
        }

        let adjacency = self.db.friend.friend_ids_of(direct).await?;
        let found = derive_friends_of_friends(user_id, direct, &adjacency);
        if found.is_empty() {
            return Ok(Vec::new());
        }

        // candidates and connectors in one read
        let mut ids: Vec<String> = found.keys().cloned().collect();
        ids.extend(direct.iter().cloned());
        let users: HashMap<String, User> = self
            .db
            .user
            .get_users(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut result: Vec<FriendOfFriend> = found
            .into_iter()
            .filter_map(|(candidate, connectors)| {
                // a profile deleted between reads drops out of the map
                let user = users.get(&candidate)?.clone();
                let mutual_connectors = connectors
                    .iter()
                    .filter_map(|id| users.get(id).map(Connector::from))
                    .collect();
                Some(FriendOfFriend {
                    user,
                    mutual_connectors,
                })
            })
            .collect();

        result.sort_by(|a, b| {
            b.mutual_connectors
                .len()
                .cmp(&a.mutual_connectors.len())
                .then_with(|| a.user.id.cmp(&b.user.id))
        });
        Ok(result)
    }

    async fn profiles(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut users = self.db.user.get_users(ids).await?;
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    pub(crate) async fn require_user(&self, user_id: &str) -> Result<User> {
        self.db
            .user
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::user_not_found(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn adjacency(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), ids(v)))
            .collect()
    }

    #[test]
    fn derive_should_keep_every_connector() {
        let adj = adjacency(&[("a", &["u", "x"]), ("b", &["u", "x", "y"])]);
        let found = derive_friends_of_friends("u", &ids(&["a", "b"]), &adj);

        assert_eq!(found.len(), 2);
        assert_eq!(found["x"], ids(&["a", "b"]));
        assert_eq!(found["y"], ids(&["b"]));
    }

    #[test]
    fn derive_should_skip_self_and_direct_friends() {
        let adj = adjacency(&[("a", &["u", "b"]), ("b", &["u", "a"])]);
        let found = derive_friends_of_friends("u", &ids(&["a", "b"]), &adj);
        assert!(found.is_empty());
    }

    #[test]
    fn derive_with_no_direct_friends_should_be_empty() {
        let found = derive_friends_of_friends("u", &[], &HashMap::new());
        assert!(found.is_empty());
    }

    #[test]
    fn derive_should_sort_connectors() {
        let adj = adjacency(&[("c", &["x"]), ("a", &["x"]), ("b", &["x"])]);
        let found = derive_friends_of_friends("u", &ids(&["c", "a", "b"]), &adj);
        assert_eq!(found["x"], ids(&["a", "b", "c"]));
    }
}
