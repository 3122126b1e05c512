//! HTTP handlers for the customer and admin areas.
//!
//! Page rendering lives elsewhere; these return the data the pages show.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Json, Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::{Deserialize, Serialize};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{AdminSession, CustomerSession};
use crate::adapters::http::state::AppState;
use crate::application::{DashboardView, LeadView, SelectPackageCommand};
use crate::domain::foundation::LeadId;
use crate::domain::lead::Package;

const DASHBOARD_PATH: &str = "/dashboard";

/// GET /dashboard - customer home
pub async fn customer_home(
    State(state): State<AppState>,
    CustomerSession(session): CustomerSession,
) -> Result<Json<DashboardView>, ApiError> {
    let view = state.dashboard_handler().handle(&session).await?;
    Ok(Json(view))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageForm {
    #[serde(rename = "packageId")]
    pub package_id: Option<String>,
}

/// POST /api/dashboard/package - customer picks a package, then back to the dashboard
pub async fn select_package(
    State(state): State<AppState>,
    CustomerSession(session): CustomerSession,
    form: Result<Form<PackageForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let package = form
        .ok()
        .and_then(|Form(f)| f.package_id)
        .and_then(|id| id.parse::<Package>().ok())
        .ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "INVALID_PACKAGE", "Invalid package")
        })?;

    state
        .select_package_handler()
        .handle(SelectPackageCommand { session, package })
        .await?;

    Ok(Redirect::to(DASHBOARD_PATH))
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminHome {
    pub email: String,
}

/// GET /admin - admin home
pub async fn admin_home(AdminSession(session): AdminSession) -> Json<AdminHome> {
    Json(AdminHome {
        email: session.email.as_str().to_string(),
    })
}

/// GET /api/admin/leads/{id} - any lead, for admins
pub async fn get_lead(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<LeadView>, ApiError> {
    let id: LeadId = id.parse().map_err(|_| ApiError::not_found("Lead not found"))?;
    state
        .lead_handler()
        .handle(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead not found"))
}
