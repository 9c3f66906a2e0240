use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use abi::errors::Error;
use abi::model::{NewUser, User, UserUpdate};

use crate::api_utils::custom_extract::{AuthUser, JsonExtractor, PathExtractor};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct OnboardingRequest {
    pub username: String,
}

// sign-up hand-off from the session collaborator, no token yet
pub async fn create_user(
    State(app_state): State<AppState>,
    JsonExtractor(new_user): JsonExtractor<NewUser>,
) -> Result<Json<User>, Error> {
    let user = app_state.service.create_user(new_user).await?;
    Ok(Json(user))
}

pub async fn get_user_by_id(
    State(app_state): State<AppState>,
    AuthUser(_): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<User>, Error> {
    let user = app_state.service.get_user(&id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonExtractor(update): JsonExtractor<UserUpdate>,
) -> Result<Json<User>, Error> {
    let user = app_state.service.update_profile(&user_id, update).await?;
    Ok(Json(user))
}

pub async fn complete_onboarding(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonExtractor(req): JsonExtractor<OnboardingRequest>,
) -> Result<Json<User>, Error> {
    let user = app_state
        .service
        .complete_onboarding(&user_id, &req.username)
        .await?;
    Ok(Json(user))
}
