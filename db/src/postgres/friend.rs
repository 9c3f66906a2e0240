use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use abi::errors::{Error, Result};

use crate::friend::FriendRepo;

#[derive(Debug)]
pub struct PostgresFriend {
    pool: PgPool,
}

impl PostgresFriend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert both directions of the edge. Existing rows are kept, so the call is
/// idempotent. Callers own the transaction.
pub(crate) async fn insert_edge(
    conn: &mut PgConnection,
    user_a: &str,
    user_b: &str,
    now: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO friends (user_id, friend_id, create_time)
        VALUES
        ($1, $2, $3),
        ($2, $1, $3)
        ON CONFLICT (user_id, friend_id) DO NOTHING",
    )
    .bind(user_a)
    .bind(user_b)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// lock both user rows so neither can vanish before the edge lands
async fn lock_users(conn: &mut PgConnection, user_a: &str, user_b: &str) -> Result<()> {
    let found: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1 OR id = $2 FOR SHARE")
            .bind(user_a)
            .bind(user_b)
            .fetch_all(conn)
            .await?;
    for id in [user_a, user_b] {
        if !found.iter().any(|(found_id,)| found_id == id) {
            return Err(Error::user_not_found(id));
        }
    }
    Ok(())
}

#[async_trait]
impl FriendRepo for PostgresFriend {
    async fn add_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        if user_a == user_b {
            return Err(Error::invalid_participants("a user cannot befriend themselves"));
        }
        let mut transaction = self.pool.begin().await?;
        lock_users(&mut *transaction, user_a, user_b).await?;
        insert_edge(&mut *transaction, user_a, user_b, crate::now()).await?;
        transaction.commit().await?;
        Ok(())
    }

    async fn remove_edge(&self, user_a: &str, user_b: &str) -> Result<()> {
        let mut transaction = self.pool.begin().await?;
        lock_users(&mut *transaction, user_a, user_b).await?;
        let result = sqlx::query(
            "DELETE FROM friends
            WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)",
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *transaction)
        .await?;
        transaction.commit().await?;
        debug!(
            "remove edge {} <-> {}: {} rows",
            user_a,
            user_b,
            result.rows_affected()
        );
        Ok(())
    }

    async fn are_friends(&self, user_a: &str, user_b: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM friends WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT friend_id FROM friends WHERE user_id = $1 ORDER BY friend_id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn friend_ids_of(&self, user_ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let mut map: HashMap<String, Vec<String>> = user_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        if user_ids.is_empty() {
            return Ok(map);
        }
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT user_id, friend_id FROM friends
            WHERE user_id = ANY($1)
            ORDER BY user_id, friend_id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        for (user_id, friend_id) in rows {
            map.entry(user_id).or_default().push(friend_id);
        }
        Ok(map)
    }
}
