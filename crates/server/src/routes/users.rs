use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use models::{NewUser, User, UserPatch};

use crate::{errors::ApiError, state::AppState};

#[utoipa::path(get, path = "/api/v1/users", tag = "users", responses((status = 200, description = "All users", body = [crate::openapi::UserDoc])))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.directory.list().await?))
}

#[utoipa::path(
    get, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn retrieve_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.directory.retrieve(&id).await?))
}

#[utoipa::path(
    post, path = "/api/v1/users", tag = "users",
    request_body = crate::openapi::NewUserDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Created", body = crate::openapi::UserDoc),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_user(State(state): State<AppState>, Json(input): Json<NewUser>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.directory.create(input).await?))
}

#[utoipa::path(
    put, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = crate::openapi::UserPatchDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.directory.update(&id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.directory.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
