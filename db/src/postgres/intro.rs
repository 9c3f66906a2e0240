use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::Result;
use abi::model::{IntroRequest, NewIntroRequest, Progress, RequestStatus};

use crate::intro::IntroRequestRepo;
use crate::postgres::friend::insert_edge;

#[derive(Debug)]
pub struct PostgresIntroRequest {
    pool: PgPool,
}

impl PostgresIntroRequest {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntroRequestRepo for PostgresIntroRequest {
    async fn create(&self, req: NewIntroRequest) -> Result<IntroRequest> {
        let now = crate::now();
        let progress = Progress::initial(req.request_type);
        // a concurrent twin trips intro_requests_live_pair and surfaces as DuplicateRequest
        let created = sqlx::query_as(
            "INSERT INTO intro_requests
            (id, request_type, from_user_id, to_user_id, via_user_id, message,
             status, connector_status, target_status, create_time, update_time)
            VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *",
        )
        .bind(nanoid!())
        .bind(req.request_type)
        .bind(&req.from_user_id)
        .bind(&req.to_user_id)
        .bind(&req.via_user_id)
        .bind(&req.message)
        .bind(progress.status)
        .bind(progress.connector_status)
        .bind(progress.target_status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<IntroRequest>> {
        let req = sqlx::query_as("SELECT * FROM intro_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(req)
    }

    async fn find_between(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<IntroRequest>> {
        let req = sqlx::query_as(
            "SELECT * FROM intro_requests
            WHERE from_user_id = $1 AND to_user_id = $2
            ORDER BY create_time DESC, id DESC
            LIMIT 1",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(req)
    }

    async fn advance(
        &self,
        id: &str,
        expected: Progress,
        next: Progress,
    ) -> Result<Option<IntroRequest>> {
        let now = crate::now();
        let mut transaction = self.pool.begin().await?;

        // compare-and-swap on the whole progress triple
        let updated: Option<IntroRequest> = sqlx::query_as(
            "UPDATE intro_requests
            SET
                status = $2,
                connector_status = $3,
                target_status = $4,
                update_time = $5
            WHERE id = $1
              AND status = $6
              AND connector_status = $7
              AND target_status = $8
            RETURNING *",
        )
        .bind(id)
        .bind(next.status)
        .bind(next.connector_status)
        .bind(next.target_status)
        .bind(now)
        .bind(expected.status)
        .bind(expected.connector_status)
        .bind(expected.target_status)
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(updated) = updated else {
            debug!("request {} moved past {:?}", id, expected);
            transaction.rollback().await?;
            return Ok(None);
        };

        if updated.status == RequestStatus::Approved {
            insert_edge(
                &mut *transaction,
                &updated.from_user_id,
                &updated.to_user_id,
                now,
            )
            .await?;
        }

        transaction.commit().await?;
        Ok(Some(updated))
    }

    async fn list_received(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        let list = sqlx::query_as(
            "SELECT * FROM intro_requests
            WHERE status = 'pending'
              AND (
                (request_type = 'friend' AND to_user_id = $1)
                OR (request_type = 'introduction' AND via_user_id = $1 AND connector_status = 'pending')
                OR (request_type = 'introduction' AND to_user_id = $1
                    AND connector_status = 'approved' AND target_status = 'pending')
              )
            ORDER BY create_time DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn list_sent(&self, user_id: &str) -> Result<Vec<IntroRequest>> {
        let list = sqlx::query_as(
            "SELECT * FROM intro_requests
            WHERE from_user_id = $1
            ORDER BY create_time DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }
}
