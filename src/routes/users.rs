use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::RouteState;
use crate::http_objects::{BlobApiError, DeleteUserResponse, User, UserRequest};

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "List all users", body = Vec<User>),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to list users")
    ),
)]
pub(crate) async fn list_users(
    State(state): State<RouteState>,
) -> Result<Json<Vec<User>>, BlobApiError> {
    let users = state.user_store.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = NOT_FOUND, description = "User not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to get user")
    ),
)]
pub(crate) async fn get_user(
    Path(id): Path<i64>,
    State(state): State<RouteState>,
) -> Result<Json<User>, BlobApiError> {
    let user = state.user_store.get(id).await?;
    Ok(Json(user.into()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = BAD_REQUEST, description = "Missing name or email", body = BlobApiError),
        (status = CONFLICT, description = "Email already exists", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to create user")
    ),
)]
pub(crate) async fn create_user(
    State(state): State<RouteState>,
    Json(request): Json<UserRequest>,
) -> Result<impl IntoResponse, BlobApiError> {
    let (name, email) = required_fields(request)?;
    let user = state.user_store.create(&name, &email).await?;
    Ok((StatusCode::CREATED, Json(User::from(user))))
}

/// Update a user by id, both fields required
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = BAD_REQUEST, description = "Missing name or email", body = BlobApiError),
        (status = NOT_FOUND, description = "User not found", body = BlobApiError),
        (status = CONFLICT, description = "Email already exists", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to update user")
    ),
)]
pub(crate) async fn update_user(
    Path(id): Path<i64>,
    State(state): State<RouteState>,
    Json(request): Json<UserRequest>,
) -> Result<Json<User>, BlobApiError> {
    let (name, email) = required_fields(request)?;
    let user = state.user_store.update(id, &name, &email).await?;
    Ok(Json(user.into()))
}

/// Delete a user by id
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = NOT_FOUND, description = "User not found", body = BlobApiError),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to delete user")
    ),
)]
pub(crate) async fn delete_user(
    Path(id): Path<i64>,
    State(state): State<RouteState>,
) -> Result<Json<DeleteUserResponse>, BlobApiError> {
    state.user_store.delete(id).await?;
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
        id,
    }))
}

fn required_fields(request: UserRequest) -> Result<(String, String), BlobApiError> {
    let name = request.name.filter(|v| !v.is_empty());
    let email = request.email.filter(|v| !v.is_empty());
    match (name, email) {
        (Some(name), Some(email)) => Ok((name, email)),
        _ => Err(BlobApiError::bad_request(
            "missing_fields",
            "Name and email are required",
        )),
    }
}
