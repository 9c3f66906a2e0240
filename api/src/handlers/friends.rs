use axum::extract::State;
use axum::Json;

use abi::errors::Error;
use abi::model::{FriendOfFriend, SocialMap, User};

use crate::api_utils::custom_extract::{AuthUser, PathExtractor};
use crate::AppState;

pub async fn get_friends(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<User>>, Error> {
    let friends = app_state.service.list_friends(&user_id).await?;
    Ok(Json(friends))
}

pub async fn delete_friend(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathExtractor(friend_id): PathExtractor<String>,
) -> Result<(), Error> {
    app_state
        .service
        .remove_friend_edge(&user_id, &friend_id)
        .await
}

pub async fn get_friends_of_friends(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FriendOfFriend>>, Error> {
    let list = app_state
        .service
        .compute_friends_of_friends(&user_id)
        .await?;
    Ok(Json(list))
}

pub async fn get_social_map(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SocialMap>, Error> {
    let map = app_state.service.social_map(&user_id).await?;
    Ok(Json(map))
}
