use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{LoginRequest, PublicUser, UserPayload},
        error::UserError,
        repo_types::User,
        services::Action,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

type Rejection = (StatusCode, String);

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), Rejection> {
    let mut user = User::from(payload);
    user.prepare();
    user.validate(Action::Create).map_err(|e| reject(e.into()))?;
    user.before_save().map_err(|e| reject(e.into()))?;

    let saved = user.save_user(state.users.as_ref()).await.map_err(reject)?;
    info!(user_id = saved.id, nickname = %saved.nickname, "user created");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, Rejection> {
    let users = User::find_all_users(state.users.as_ref())
        .await
        .map_err(reject)?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, Rejection> {
    let user = User::find_by_id(state.users.as_ref(), id)
        .await
        .map_err(reject)?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<User>, Rejection> {
    let mut user = User::from(payload);
    user.prepare();
    user.validate(Action::Update).map_err(|e| reject(e.into()))?;

    let updated = user
        .updated_user(state.users.as_ref(), id)
        .await
        .map_err(reject)?;
    info!(user_id = updated.id, "user updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    match User::delete_user(state.users.as_ref(), id).await {
        Ok(0) => Err(reject(UserError::NotFound)),
        Ok(_) => {
            info!(user_id = id, "user deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(reject(e)),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PublicUser>, Rejection> {
    let password = payload.password.clone();
    let mut user = User::new("", payload.email, payload.password);
    user.prepare();
    user.validate(Action::Login).map_err(|e| reject(e.into()))?;

    let user = User::sign_in(state.users.as_ref(), &user.email, &password)
        .await
        .map_err(reject)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(user.into()))
}

fn reject(e: UserError) -> Rejection {
    let status = e.status();
    if status.is_server_error() {
        error!(error = %e, "request failed");
    } else {
        warn!(error = %e, %status, "request rejected");
    }
    (status, e.to_string())
}
