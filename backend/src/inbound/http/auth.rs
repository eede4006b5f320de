//! Authentication endpoints.
//!
//! ```text
//! POST /auth/signup {"username":"bob","password":"secret1"}
//! POST /auth/login  {"username":"bob","password":"secret1"}
//! POST /auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::auth;
use crate::domain::ports::LedgerStore;
use crate::domain::user::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionSettings, issue_cookies, removal_cookies};

/// Request body shared by signup and login.
///
/// Fields default to empty strings so absent and empty values produce the
/// same validation outcome.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CredentialsRequest {
    /// Account name, at least three characters at signup.
    #[serde(default)]
    pub username: String,
    /// Plaintext password, at least six characters at signup.
    #[serde(default)]
    pub password: String,
}

fn success_with_session(user: &User, settings: SessionSettings) -> HttpResponse {
    let [username, password_hash] = issue_cookies(&user.username, &user.password_hash, settings);
    HttpResponse::Ok()
        .cookie(username)
        .cookie(password_hash)
        .json(json!({ "success": true }))
}

/// Register a new account and establish a session.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created; session cookies set"),
        (status = 400, description = "Missing or short fields, or duplicate username"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    store: web::Data<dyn LedgerStore>,
    settings: web::Data<SessionSettings>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let user = auth::signup(store.get_ref(), &request.username, &request.password).await?;
    info!(username = %user.username, "account created");
    Ok(success_with_session(&user, *settings.get_ref()))
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success; session cookies set"),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    store: web::Data<dyn LedgerStore>,
    settings: web::Data<SessionSettings>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let user = auth::login(store.get_ref(), &request.username, &request.password).await?;
    info!(username = %user.username, "login succeeded");
    Ok(success_with_session(&user, *settings.get_ref()))
}

/// End the session by expiring both session cookies.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookies cleared")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout() -> HttpResponse {
    let [username, password_hash] = removal_cookies();
    HttpResponse::Ok()
        .cookie(username)
        .cookie(password_hash)
        .json(json!({ "success": true }))
}
