use std::future::Future;
use std::path::{Path, PathBuf};
use std::thread;

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tokio::runtime::Runtime;

use abi::config::PostgresConfig;

/// A throwaway database on a live server: created and migrated on `new`,
/// dropped when the value goes away.
pub struct TestDb {
    server_url: String,
    dbname: String,
}

/// `Drop` cannot await and tests may already be inside a runtime, so setup and
/// teardown get a runtime of their own on a separate thread.
fn on_fresh_runtime<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    thread::spawn(move || {
        Runtime::new()
            .expect("test runtime")
            .block_on(fut)
    })
    .join()
    .expect("test database setup thread panicked");
}

impl TestDb {
    pub fn new(server_url: impl Into<String>, migrations: impl AsRef<Path>) -> TestDb {
        let tdb = TestDb {
            server_url: server_url.into(),
            dbname: format!("test_{}", uuid::Uuid::new_v4().simple()),
        };

        let server_url = tdb.server_url.clone();
        let url = tdb.url();
        let create = format!(r#"CREATE DATABASE "{}""#, tdb.dbname);
        let migrations: PathBuf = migrations.as_ref().to_path_buf();
        on_fresh_runtime(async move {
            let server = PgPool::connect(&server_url).await.expect("connect server");
            sqlx::query(&create)
                .execute(&server)
                .await
                .expect("create test database");

            let pool = PgPool::connect(&url).await.expect("connect test database");
            Migrator::new(migrations.as_path())
                .await
                .expect("load migrations")
                .run(&pool)
                .await
                .expect("run migrations");
        });
        tdb
    }

    /// same server as the service config, fresh database
    pub fn from_config(config: &PostgresConfig, migrations: impl AsRef<Path>) -> TestDb {
        Self::new(config.server_url(), migrations)
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url, self.dbname)
    }

    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    pub async fn pool(&self) -> PgPool {
        PgPool::connect(&self.url()).await.expect("connect test database")
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let server_url = self.server_url.clone();
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.dbname
        );
        let drop_db = format!(r#"DROP DATABASE IF EXISTS "{}""#, self.dbname);
        on_fresh_runtime(async move {
            let server = PgPool::connect(&server_url).await.expect("connect server");
            sqlx::query(&terminate)
                .execute(&server)
                .await
                .expect("terminate test connections");
            sqlx::query(&drop_db)
                .execute(&server)
                .await
                .expect("drop test database");
        });
    }
}
