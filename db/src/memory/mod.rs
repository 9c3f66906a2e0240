use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use nanoid::nanoid;
use tokio::sync::RwLock;
use tracing::debug;

use abi::errors::{Error, Result};
use abi::model::{
    IntroRequest, NewIntroRequest, NewUser, Progress, RequestStatus, User, UserUpdate,
};

use crate::friend::FriendRepo;
use crate::intro::IntroRequestRepo;
use crate::user::UserRepo;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    friends: HashMap<String, BTreeSet<String>>,
    requests: HashMap<String, IntroRequest>,
    /// request ids in creation order
    request_order: Vec<String>,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<&str>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id.as_str()) != except)
    }

    fn ensure_user(&self, id: &str) -> Result<()> {
        if self.users.contains_key(id) {
            Ok(())
        } else {
            Err(Error::user_not_found(id))
        }
    }

    fn link(&mut self, user_a: &str, user_b: &str) {
        self.friends
            .entry(user_a.to_string())
            .or_default()
            .insert(user_b.to_string());
        self.friends
            .entry(user_b.to_string())
            .or_default()
            .insert(user_a.to_string());
    }

    fn unlink(&mut self, user_a: &str, user_b: &str) {
        if let Some(set) = self.friends.get_mut(user_a) {
            set.remove(user_b);
        }
        if let Some(set) = self.friends.get_mut(user_b) {
            set.remove(user_a);
        }
    }

    fn newest_first<'a>(
        &'a self,
        filter: impl Fn(&IntroRequest) -> bool + 'a,
    ) -> impl Iterator<Item = &'a IntroRequest> + 'a {
        self.request_order
            .iter()
            .rev()
            .filter_map(|id| self.requests.get(id))
            .filter(move |req| filter(*req))
    }
}

/// In-process store. All tables sit behind one lock, so each trait call is a
/// single atomic unit for every other caller.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, None) {
            return Err(Error::username_taken(user.username));
        }
        let now = crate::now();
        let created = User {
            id: nanoid!(),
            username: user.username,
            name: user.name,
            bio: user.bio,
            location: user.location,
            photo: user.photo,
            create_time: now,
            update_time: now,
            ..Default::default()
        };
        tables.users.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn update_profile(&self, id: &str, update: UserUpdate) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(id)
            .ok_or_else(|| Error::user_not_found(id))?;
        update.apply(user);
        user.update_time = crate::now();
        Ok(user.clone())
    }

    async fn complete_onboarding(&self, id: &str, username: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        match tables.users.get(id) {
            None => return Err(Error::user_not_found(id)),
            Some(user) if user.onboarded => return Err(Error::username_locked()),
            Some(_) => {}
        }
        if tables.username_taken(username, Some(id)) {
            return Err(Error::username_taken(username));
        }
        let user = tables
            .users
            .get_mut(id)
            .ok_or_else(|| Error::user_not_found(id))?;
        user.username = username.to_string();
        user.onboarded = true;
        user.update_time = crate::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl FriendRepo for MemoryStore {
    async fn add_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        if user_a == user_b {
            return Err(Error::invalid_participants(
                "a user cannot befriend themselves",
            ));
        }
        let mut tables = self.tables.write().await;
        tables.ensure_user(user_a)?;
        tables.ensure_user(user_b)?;
        tables.link(user_a, user_b);
        Ok(())
    }

    async fn remove_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(user_a)?;
        tables.ensure_user(user_b)?;
        tables.unlink(user_a, user_b);
        Ok(())
    }

    async fn are_friends(&self, user_a: &str, user_b: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .friends
            .get(user_a)
            .is_some_and(|set| set.contains(user_b)))
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let ids: Vec<String> = tables
            .friends
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        Ok(ids)
    }

    async fn friend_ids_of(&self, user_ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let tables = self.tables.read().await;
        Ok(user_ids
            .iter()
            .map(|id| {
                let friends: Vec<String> = tables
                    .friends
                    .get(id)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default();
                (id.clone(), friends)
            })
            .collect())
    }
}

#[async_trait]
impl IntroRequestRepo for MemoryStore {
    async fn create(&self, req: NewIntroRequest) -> Result<IntroRequest> {
        let mut tables = self.tables.write().await;
        for id in [&req.from_user_id, &req.to_user_id, &req.via_user_id] {
            tables.ensure_user(id)?;
        }
        // same guarantee as the live-pair unique index
        let live = tables.requests.values().any(|r| {
            r.is_live() && r.from_user_id == req.from_user_id && r.to_user_id == req.to_user_id
        });
        if live {
            return Err(Error::duplicate_request());
        }

        let now = crate::now();
        let progress = Progress::initial(req.request_type);
        let created = IntroRequest {
            id: nanoid!(),
            request_type: req.request_type,
            from_user_id: req.from_user_id,
            to_user_id: req.to_user_id,
            via_user_id: req.via_user_id,
            message: req.message,
            status: progress.status,
            connector_status: progress.connector_status,
            target_status: progress.target_status,
            create_time: now,
            update_time: now,
        };
        tables.request_order.push(created.id.clone());
        tables.requests.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<IntroRequest>> {
        Ok(self.tables.read().await.requests.get(id).cloned())
    }

    async fn find_between(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<IntroRequest>> {
        let tables = self.tables.read().await;
        let found = tables
            .newest_first(|r| r.from_user_id == from_user_id && r.to_user_id == to_user_id)
            .next()
            .cloned();
        Ok(found)
    }

    async fn advance(
        &self,
        id: &str,
        expected: Progress,
        next: Progress,
    ) -> Result<Option<IntroRequest>> {
        let mut tables = self.tables.write().await;
        let Some(req) = tables.requests.get_mut(id) else {
            return Ok(None);
        };
        if req.progress() != expected {
            debug!("request {} moved past {:?}", id, expected);
            return Ok(None);
        }
        req.set_progress(next);
        req.update_time = crate::now();
        let updated = req.clone();

        if updated.status == RequestStatus::Approved {
            tables.link(&updated.from_user_id, &updated.to_user_id);
        }
        Ok(Some(updated))
    }

    async fn list_received(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .newest_first(|r| r.awaits(user_id))
            .cloned()
            .collect())
    }

    async fn list_sent(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .newest_first(|r| r.from_user_id == user_id)
            .cloned()
            .collect())
    }
}
