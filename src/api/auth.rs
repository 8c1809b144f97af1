use crate::database::MongoDB;
use crate::middleware::AuthUser;
use crate::services::auth_service::{self, LoginRequest, RegisterRequest};
use crate::services::user_service;
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, JWT returned"),
        (status = 400, description = "Validation failure or duplicate username/email")
    )
)]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service::register(&db, &body).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "JWT returned"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service::login(&db, &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/auth/me - current account, password stripped
pub async fn get_me(user: AuthUser, db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().user_oid()?;
    let account = user_service::fetch_user(&db, &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": account.sanitized(),
    })))
}
