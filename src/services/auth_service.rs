use crate::database::{MongoDB, USERS};
use crate::models::{validate_new_user, Role, User};
use crate::utils::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id (hex)
    pub username: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

impl Claims {
    pub fn user_oid(&self) -> Result<ObjectId, AppError> {
        ObjectId::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "peerlearn-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "peerlearn-api".to_string())
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user
            .id
            .map(|id| id.to_hex())
            .ok_or_else(|| AppError::Database("User has no id".to_string()))?,
        username: user.username.clone(),
        role: user.role,
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Database(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

// Register a new account
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
    validate_new_user(&request.username, &request.email, &request.password)?;

    let collection = db.collection::<User>(USERS);

    let existing = collection
        .find_one(doc! {
            "$or": [
                { "email": request.email.to_lowercase() },
                { "username": request.username.trim() },
            ]
        })
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "Username or email already in use".to_string(),
        ));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))?;

    let mut user = User::new(
        request.username.trim().to_string(),
        request.email.to_lowercase(),
        password_hash,
    );

    let result = collection.insert_one(&user).await?;
    user.id = result.inserted_id.as_object_id();

    let token = generate_jwt(&user)?;
    Ok(AuthResponse {
        success: true,
        token,
        user: user.sanitized(),
    })
}

// User login
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let collection = db.collection::<User>(USERS);

    let user = collection
        .find_one(doc! { "email": request.email.to_lowercase() })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".to_string()));
    }

    let stored_hash = user
        .password
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, stored_hash)
        .map_err(|e| AppError::Database(format!("Failed to verify password: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = generate_jwt(&user)?;
    Ok(AuthResponse {
        success: true,
        token,
        user: user.sanitized(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let mut user = User::new(
            "alice".to_string(),
            "alice@example.edu".to_string(),
            "$2b$10$hash".to_string(),
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn jwt_round_trip() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.unwrap().to_hex());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Student);
        assert!(!claims.is_admin());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let user = sample_user();
        let mut token = generate_jwt(&user).unwrap();
        token.push('x');
        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn claims_subject_parses_back_to_object_id() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.user_oid().unwrap(), user.id.unwrap());
    }
}
