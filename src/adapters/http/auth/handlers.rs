//! HTTP handlers for login links, redemption and logout.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::application::{RedeemLoginLinkCommand, RedeemLoginLinkResult, RequestLoginLinkCommand};
use crate::domain::auth::Role;

use super::dto::{MagicLinkRequest, MagicLinkResponse, VerifyParams};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;

/// Where the browser lands after logging out.
pub const LOGGED_OUT_PATH: &str = "/bye";

/// POST /api/auth/magic-link - email a customer login link
pub async fn request_customer_link(
    State(state): State<AppState>,
    payload: Result<Json<MagicLinkRequest>, JsonRejection>,
) -> Result<Json<MagicLinkResponse>, ApiError> {
    request_link(state, payload, Role::Customer).await
}

/// POST /api/auth/admin/magic-link - email the admin login link
pub async fn request_admin_link(
    State(state): State<AppState>,
    payload: Result<Json<MagicLinkRequest>, JsonRejection>,
) -> Result<Json<MagicLinkResponse>, ApiError> {
    request_link(state, payload, Role::Admin).await
}

async fn request_link(
    state: AppState,
    payload: Result<Json<MagicLinkRequest>, JsonRejection>,
    role: Role,
) -> Result<Json<MagicLinkResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected login link request body");
        ApiError::bad_request("Invalid request body")
    })?;

    state
        .request_login_link_handler()
        .handle(RequestLoginLinkCommand {
            email: body.email,
            role,
        })
        .await?;

    Ok(Json(MagicLinkResponse { success: true }))
}

/// GET /api/auth/verify?token= - redeem a link and start the session
///
/// Always redirects: to the role's home on success, otherwise to a login
/// page with `?error=<reason>`.
pub async fn verify_login_link(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let result = state
        .redeem_login_link_handler()
        .handle(RedeemLoginLinkCommand {
            token: params.token,
        })
        .await;

    let location = result.redirect_path();
    match result {
        RedeemLoginLinkResult::SignedIn { session_token, .. } => (
            state.settings.cookie.set(jar, session_token),
            Redirect::to(&location),
        ),
        RedeemLoginLinkResult::Failed { .. } => (jar, Redirect::to(&location)),
    }
}

/// GET|POST /api/auth/logout - clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (state.settings.cookie.clear(jar), Redirect::to(LOGGED_OUT_PATH))
}
