use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::friends::{
    delete_friend, get_friends, get_friends_of_friends, get_social_map,
};
use crate::handlers::intros::{
    approve, decline, find_between, list_received, list_sent, submit_request,
};
use crate::handlers::users::{complete_onboarding, create_user, get_user_by_id, update_user};
use crate::AppState;

pub(crate) fn app_routes(state: AppState) -> Router {
    Router::new()
        .nest("/user", user_routes(state.clone()))
        .nest("/intro", intro_routes(state.clone()))
        .nest("/friend", friend_routes(state))
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_user).put(update_user))
        .route("/onboarding", put(complete_onboarding))
        .route("/:id", get(get_user_by_id))
        .with_state(state)
}

fn intro_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(submit_request))
        .route("/received", get(list_received))
        .route("/sent", get(list_sent))
        .route("/between/:user_id", get(find_between))
        .route("/:id/approve", put(approve))
        .route("/:id/decline", put(decline))
        .with_state(state)
}

fn friend_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_friends))
        .route("/fof", get(get_friends_of_friends))
        .route("/map", get(get_social_map))
        .route("/:user_id", delete(delete_friend))
        .with_state(state)
}
