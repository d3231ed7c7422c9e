use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use invoify_auth::{SignIn, SignUp, UserAccount, hash_password, verify_password};

use crate::app::dto::{AccountResponse, MessageResponse, SignInResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::middleware::{clear_session_cookie, session_cookie};

const BAD_CREDENTIALS: &str = "Invalid email or password";

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/signout", post(sign_out))
}

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SignUp>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let account = body.validate()?;

    if services.store.find_account_by_email(&account.email).await?.is_some() {
        return Err(invoify_core::DomainError::conflict("User already exists").into());
    }

    let cost = services.bcrypt_cost;
    let password = account.password.clone();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let account = UserAccount::register(account, hash, Utc::now());
    services.store.create_account(account.clone()).await?;
    tracing::info!(user_id = %account.id, "account created");

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))).into_response())
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SignIn>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let (email, password) = body.credentials()?;

    let Some(account) = services.store.find_account_by_email(&email).await? else {
        tracing::debug!("sign-in for unknown email");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    };

    let password = password.to_string();
    let hash = account.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("password check task failed: {e}")))?;
    if !verified {
        tracing::debug!(user_id = %account.id, "sign-in with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    let issued = services
        .tokens
        .issue(account.id, &account.email, Utc::now())
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let cookie = session_cookie(&issued.token, services.tokens.ttl())
        .ok_or_else(|| ApiError::internal("session token is not a valid cookie value"))?;
    tracing::info!(user_id = %account.id, "signed in");

    let body = SignInResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: AccountResponse::from(&account),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn sign_out() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse::new("Signed out")),
    )
        .into_response()
}
