//! Registration and account endpoints.

use api_types::user::{UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
    }
}

/// Creates an account; needs no credentials.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register(&payload.email, &payload.password, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn me(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(view(user)))
}

/// Deletes the caller's account and all of their expenses.
pub async fn delete_me(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
