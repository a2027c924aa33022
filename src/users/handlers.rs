use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    store::{with_deadline, User},
    users::{
        dto::CreateUserRequest,
        services::{hash_password, validate},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let mut new_user = validate(payload).map_err(|e| {
        warn!(error = %e, "invalid create user request");
        e
    })?;

    new_user.password = hash_password(&new_user.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let deadline = Instant::now() + state.config.request_timeout;
    let user = with_deadline(deadline, state.store.users.create(new_user))
        .await
        .map_err(|e| {
            let err = ApiError::from(e);
            match &err {
                ApiError::Internal(source) => error!(error = %source, "create user failed"),
                other => warn!(error = %other, "create user rejected"),
            }
            err
        })?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}
