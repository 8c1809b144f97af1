use crate::services::auth_service::{self, Claims};
use crate::utils::error::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Authenticated caller, extracted from the `Authorization: Bearer`
/// header. Handlers that take an `AuthUser` are protected; handlers that
/// don't are public. This keeps mixed public/protected scopes (public
/// GET, protected PUT on the same path) out of route registration.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

    let header_str = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid token format".to_string()))?;

    let token = header_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    let claims = auth_service::verify_token(token)?;
    Ok(AuthUser(claims))
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
