//! Request and response bodies for auth endpoints.

use serde::{Deserialize, Serialize};

/// `POST /api/auth/magic-link` and `POST /api/auth/admin/magic-link` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MagicLinkRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicLinkResponse {
    pub success: bool,
}

/// `GET /api/auth/verify` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyParams {
    pub token: Option<String>,
}
