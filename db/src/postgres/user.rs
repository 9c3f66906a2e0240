use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::{Error, Result};
use abi::model::{NewUser, User, UserUpdate};

use crate::user::UserRepo;

#[derive(Debug)]
pub struct PostgresUser {
    pool: PgPool,
}

impl PostgresUser {
    pub fn new(pool: PgPool) -> Self {
        PostgresUser { pool }
    }
}

#[async_trait]
impl UserRepo for PostgresUser {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = crate::now();
        let result = sqlx::query_as(
            "INSERT INTO users
            (id, username, name, bio, location, photo, create_time, update_time)
            VALUES
            ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING *",
        )
        .bind(nanoid!())
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.location)
        .bind(&user.photo)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(result)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: &str, update: UserUpdate) -> Result<User> {
        let user = sqlx::query_as(
            "UPDATE users SET
            name = COALESCE($2, name),
            bio = COALESCE($3, bio),
            location = COALESCE($4, location),
            photo = COALESCE($5, photo),
            twitter = COALESCE($6, twitter),
            instagram = COALESCE($7, instagram),
            linkedin = COALESCE($8, linkedin),
            update_time = $9
            WHERE id = $1
            RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(&update.photo)
        .bind(&update.twitter)
        .bind(&update.instagram)
        .bind(&update.linkedin)
        .bind(crate::now())
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| Error::user_not_found(id))
    }

    async fn complete_onboarding(&self, id: &str, username: &str) -> Result<User> {
        // the onboarded guard makes the username write one-shot
        let user: Option<User> = sqlx::query_as(
            "UPDATE users SET username = $2, onboarded = TRUE, update_time = $3
            WHERE id = $1 AND onboarded = FALSE
            RETURNING *",
        )
        .bind(id)
        .bind(username)
        .bind(crate::now())
        .fetch_optional(&self.pool)
        .await?;
        if let Some(user) = user {
            return Ok(user);
        }

        debug!("onboarding rejected for {}", id);
        match self.get_user(id).await? {
            Some(_) => Err(Error::username_locked()),
            None => Err(Error::user_not_found(id)),
        }
    }
}
