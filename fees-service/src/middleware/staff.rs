//! Staff context extracted from gateway headers.
//!
//! The API gateway authenticates the user and forwards their identity in
//! X-User-ID and X-User-Role. This service trusts those headers; it never
//! sees credentials itself.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

/// Role forwarded by the gateway. Unknown role strings map to `Other` so a
/// newly introduced role fails authorization instead of the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    SuperAdmin,
    Admin,
    Accountant,
    Teacher,
    Other,
}

impl StaffRole {
    pub fn from_header(value: &str) -> Self {
        match value {
            "SUPER_ADMIN" => StaffRole::SuperAdmin,
            "ADMIN" => StaffRole::Admin,
            "ACCOUNTANT" => StaffRole::Accountant,
            "TEACHER" => StaffRole::Teacher,
            _ => StaffRole::Other,
        }
    }

    /// Roles allowed to record payments.
    pub fn can_collect_fees(&self) -> bool {
        matches!(
            self,
            StaffRole::SuperAdmin | StaffRole::Admin | StaffRole::Accountant
        )
    }
}

/// Identity of the staff member making the request.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub user_id: String,
    pub role: StaffRole,
}

impl StaffContext {
    pub fn require_fee_collection(&self) -> Result<(), AppError> {
        if self.role.can_collect_fees() {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role is not permitted to record fee payments"
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-ID header (required from gateway)"
                ))
            })?;

        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-Role header (required from gateway)"
                ))
            })?;

        let span = tracing::Span::current();
        span.record("user_id", user_id);
        span.record("user_role", role);

        Ok(StaffContext {
            user_id: user_id.to_string(),
            role: StaffRole::from_header(role),
        })
    }
}
