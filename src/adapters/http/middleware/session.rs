//! Session middleware, page gate and role extractors.
//!
//! ```text
//! Request → session_middleware → verified SessionClaims in extensions
//!                 ↓
//!           page_gate → redirect to the area's login page when the role is wrong
//!                 ↓
//!           Handler → CustomerSession / AdminSession read the extensions (401 JSON)
//! ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::session_cookie::SessionCookie;
use crate::adapters::http::state::AppState;
use crate::domain::auth::{Role, SessionClaims};

/// Verifies the session cookie and injects the claims.
///
/// A missing or invalid cookie is not an error here; gates and extractors
/// decide what an anonymous request may do.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(claims) = SessionCookie::read(&jar).and_then(|t| state.session_codec.verify(t)) {
        request.extensions_mut().insert(claims);
    }
    next.run(request).await
}

/// Role a page path requires, if any.
///
/// Login pages and the customer auth callback pages stay public.
pub fn required_role(path: &str) -> Option<Role> {
    if is_under(path, "/dashboard") {
        if path == "/dashboard/login" || path.starts_with("/dashboard/auth/") {
            return None;
        }
        return Some(Role::Customer);
    }
    if is_under(path, "/admin") {
        if path == "/admin/login" {
            return None;
        }
        return Some(Role::Admin);
    }
    None
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Redirects page requests without a session of the required role.
pub async fn page_gate(request: Request, next: Next) -> Response {
    let Some(required) = required_role(request.uri().path()) else {
        return next.run(request).await;
    };

    let allowed = request
        .extensions()
        .get::<SessionClaims>()
        .is_some_and(|claims| claims.has_role(required));

    if allowed {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), role = %required, "Page gate redirect");
        Redirect::temporary(required.login_path()).into_response()
    }
}

fn claims_with_role(parts: &Parts, role: Role) -> Result<SessionClaims, ApiError> {
    parts
        .extensions
        .get::<SessionClaims>()
        .filter(|claims| claims.has_role(role))
        .cloned()
        .ok_or_else(ApiError::unauthorized)
}

/// Extractor that requires a customer session.
#[derive(Debug, Clone)]
pub struct CustomerSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CustomerSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_with_role(parts, Role::Customer).map(CustomerSession)
    }
}

/// Extractor that requires an admin session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_with_role(parts, Role::Admin).map(AdminSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_pages_need_customer() {
        assert_eq!(required_role("/dashboard"), Some(Role::Customer));
        assert_eq!(required_role("/dashboard/invoices"), Some(Role::Customer));
        assert_eq!(required_role("/dashboard/login"), None);
        assert_eq!(required_role("/dashboard/auth/callback"), None);
    }

    #[test]
    fn admin_pages_need_admin() {
        assert_eq!(required_role("/admin"), Some(Role::Admin));
        assert_eq!(required_role("/admin/leads/1"), Some(Role::Admin));
        assert_eq!(required_role("/admin/login"), None);
    }

    #[test]
    fn other_paths_are_public() {
        assert_eq!(required_role("/"), None);
        assert_eq!(required_role("/pricing"), None);
        assert_eq!(required_role("/administrator"), None);
        assert_eq!(required_role("/api/dashboard/checkout"), None);
    }
}
