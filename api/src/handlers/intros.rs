use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use abi::errors::Error;
use abi::model::{IntroRequest, RequestType};
use intro::SubmitRequest;

use crate::api_utils::custom_extract::{AuthUser, JsonExtractor, PathExtractor};
use crate::AppState;

/// the sender is always the caller
#[derive(Debug, Deserialize, Serialize)]
pub struct NewRequestBody {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub to_user_id: String,
    #[serde(default)]
    pub via_user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn submit_request(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonExtractor(body): JsonExtractor<NewRequestBody>,
) -> Result<Json<IntroRequest>, Error> {
    debug!("{} submits {:?}", user_id, body);
    let req = app_state
        .service
        .submit_request(SubmitRequest {
            request_type: body.request_type,
            from_user_id: user_id,
            to_user_id: body.to_user_id,
            via_user_id: body.via_user_id,
            message: body.message,
        })
        .await?;
    Ok(Json(req))
}

pub async fn approve(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<IntroRequest>, Error> {
    let req = app_state.service.approve_request(&id, &user_id).await?;
    Ok(Json(req))
}

pub async fn decline(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<IntroRequest>, Error> {
    let req = app_state.service.decline_request(&id, &user_id).await?;
    Ok(Json(req))
}

pub async fn list_received(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<IntroRequest>>, Error> {
    let list = app_state.service.list_received(&user_id).await?;
    Ok(Json(list))
}

pub async fn list_sent(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<IntroRequest>>, Error> {
    let list = app_state.service.list_sent(&user_id).await?;
    Ok(Json(list))
}

// `null` when the caller never asked this user
pub async fn find_between(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathExtractor(other): PathExtractor<String>,
) -> Result<Json<Option<IntroRequest>>, Error> {
    let req = app_state.service.find_between(&user_id, &other).await?;
    Ok(Json(req))
}
