//! User routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    middleware::AuthUser,
};
use herkey_core::auth::{AuthService, CreateUserInput, UpdateUserInput};
use herkey_db::UserRepository;
use herkey_shared::auth::UserInfo;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

/// Request body for creating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login name.
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub username: String,
    /// Plaintext password.
    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: String,
    /// Email address.
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    /// Given name.
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

/// Request body for `PUT` and `PATCH`; `PUT` additionally requires `username`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// Login name.
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub username: Option<String>,
    /// Email address.
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    /// Given name.
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    /// Family name.
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserInput {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

fn service(state: &AppState) -> AuthService<UserRepository> {
    AuthService::new(Arc::new(UserRepository::new((*state.db).clone())))
}

/// GET /users
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = service(&state).list().await?;
    Ok(Json(users.iter().map(|u| u.info()).collect()))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserInfo>> {
    Ok(Json(service(&state).get(id).await?.info()))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = service(&state)
        .register(CreateUserInput {
            username: payload.username,
            password: payload.password,
            email: payload.email.unwrap_or_default(),
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name.unwrap_or_default(),
        })
        .await?;

    info!(
        user_id = user.id,
        created_by = auth.user_id(),
        created_by_name = auth.username(),
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user.info())))
}

/// PUT /users/{id}
async fn replace_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    if payload.username.is_none() {
        return Err(ApiError::field("username", "This field is required."));
    }
    update_user(&state, &auth, id, payload).await
}

/// PATCH /users/{id}
async fn patch_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    update_user(&state, &auth, id, payload).await
}

async fn update_user(
    state: &AppState,
    auth: &AuthUser,
    id: i32,
    payload: UpdateUserRequest,
) -> ApiResult<Json<UserInfo>> {
    let user = service(state).update(id, payload.into()).await?;

    info!(
        user_id = id,
        updated_by = auth.user_id(),
        updated_by_name = auth.username(),
        "User updated"
    );

    Ok(Json(user.info()))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    service(&state).delete(id).await?;

    info!(
        user_id = id,
        deleted_by = auth.user_id(),
        deleted_by_name = auth.username(),
        "User deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{app, bearer, body_json, json_request, send};

    #[tokio::test]
    async fn test_create_user_validation() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request(
                "POST",
                "/api/users",
                Some(&auth),
                r#"{"username": "grace", "password": "short", "email": "nope"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["fields"]["password"][0],
            "Ensure this field has at least 8 characters."
        );
        assert_eq!(body["fields"]["email"][0], "Enter a valid email address.");
    }

    #[tokio::test]
    async fn test_put_requires_username() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request(
                "PUT",
                "/api/users/1",
                Some(&auth),
                r#"{"first_name": "Grace"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["fields"]["username"][0],
            "This field is required."
        );
    }

    #[tokio::test]
    async fn test_patch_validates_email() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request(
                "PATCH",
                "/api/users/1",
                Some(&auth),
                r#"{"email": "not-an-email"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["fields"]["email"][0],
            "Enter a valid email address."
        );
    }

    #[tokio::test]
    async fn test_delete_requires_auth() {
        let (router, _) = app();
        let response = send(router, json_request("DELETE", "/api/users/1", None, "")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_numeric_user_id_is_rejected() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(router, json_request("GET", "/api/users/abc", Some(&auth), "")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
