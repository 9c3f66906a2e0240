use axum::Router;
use tracing::info;

use abi::config::Config;
use abi::errors::Error;
use db::DbRepo;
use intro::IntroService;

pub mod api_utils;
pub(crate) mod handlers;
pub(crate) mod routes;

pub use api_utils::custom_extract::Claims;

#[derive(Clone, Debug)]
pub struct AppState {
    pub service: IntroService,
    pub jwt_secret: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let db = DbRepo::new(config).await?;
        Ok(Self::with_service(
            IntroService::new(db),
            config.server.jwt_secret.clone(),
        ))
    }

    pub fn with_service(service: IntroService, jwt_secret: impl Into<String>) -> Self {
        Self {
            service,
            jwt_secret: jwt_secret.into(),
        }
    }
}

/// the full router, ready to serve
pub fn app(state: AppState) -> Router {
    routes::app_routes(state)
}

pub async fn start(config: Config) -> Result<(), Error> {
    let state = AppState::new(&config).await?;
    let app = app(state);
    let listener = tokio::net::TcpListener::bind(&config.server.server_url()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
