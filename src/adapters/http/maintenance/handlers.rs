//! HTTP handlers for scheduled cleanup and unsubscribe links.

use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::UnsubscribeCommand;
use crate::domain::foundation::crypto::constant_time_eq;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub ok: bool,
    pub deleted: u64,
}

/// GET /api/cron/cleanup-magic-links - delete expired and used links
///
/// Requires `Authorization: Bearer <cron secret>`; refused outright when no
/// secret is configured.
pub async fn cleanup_magic_links(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>, ApiError> {
    let Some(secret) = &state.settings.cron_secret else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "CRON_NOT_CONFIGURED",
            "Cleanup trigger not configured",
        ));
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or_default();
    if !constant_time_eq(presented.as_bytes(), secret.expose_secret().as_bytes()) {
        return Err(ApiError::unauthorized());
    }

    let result = state.cleanup_magic_links_handler().handle().await.map_err(|e| {
        tracing::error!(error = %e, "Magic link cleanup failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "CLEANUP_FAILED",
            "Cleanup failed",
        )
    })?;

    Ok(Json(CleanupResponse {
        ok: true,
        deleted: result.deleted,
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsubscribeParams {
    pub email: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeResponse {
    pub ok: bool,
    pub email: String,
}

/// GET /unsubscribe?email=&token= - opt out of marketing email
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(params): Query<UnsubscribeParams>,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let email = state
        .unsubscribe_handler()
        .handle(UnsubscribeCommand {
            email: params.email,
            token: params.token,
        })
        .await?;

    Ok(Json(UnsubscribeResponse {
        ok: true,
        email: email.as_str().to_string(),
    }))
}
