use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::extract::ApiJson;
use super::server::AppState;
use super::session::{CurrentPrincipal, SessionManager};
use crate::errors::AppError;
use shop_types::domain::user::Principal;
use shop_types::ports::ShopRepository;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    message: &'static str,
    user: Principal,
}

#[derive(Serialize)]
pub struct MeResponse {
    user: Principal,
}

fn with_session(
    sessions: &SessionManager,
    principal: Principal,
    message: &'static str,
) -> Result<Response, AppError> {
    let token = sessions.issue(&principal)?;
    let cookie = sessions.session_cookie(&token);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(SessionResponse {
            message,
            user: principal,
        }),
    )
        .into_response())
}

pub async fn register<R: ShopRepository>(
    State(state): State<AppState<R>>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Response, AppError> {
    let principal = state
        .services
        .auth
        .register(&creds.email, &creds.password)
        .await?;
    with_session(&state.sessions, principal, "User created successfully")
}

pub async fn login<R: ShopRepository>(
    State(state): State<AppState<R>>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Response, AppError> {
    if creds.email.trim().is_empty() || creds.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".into(),
        ));
    }
    let principal = state
        .services
        .auth
        .login(&creds.email, &creds.password)
        .await?;
    with_session(&state.sessions, principal, "Login successful")
}

pub async fn me(CurrentPrincipal(user): CurrentPrincipal) -> Json<MeResponse> {
    Json(MeResponse { user })
}

pub async fn logout(State(sessions): State<Arc<SessionManager>>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, sessions.clear_cookie())],
    )
}
