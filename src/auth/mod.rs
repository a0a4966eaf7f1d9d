/*!
 * # Authentication and Authorization Module
 *
 * Sessions are HS256 JWTs carried either in the `SESSION` cookie or an
 * `Authorization: Bearer` header. Users are provisioned on first login; the
 * configured admin allow-list decides their role on every login.
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, DbErr, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    entities::{app_user, Role},
    errors::ErrorResponse,
    repositories::AppUserRepository,
};

mod rbac;

pub use rbac::*;

pub const SESSION_COOKIE: &str = "SESSION";
pub const LEGACY_SESSION_COOKIE: &str = "JSESSIONID";

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // Subject (user email)
    pub name: Option<String>, // Display name
    pub role: Role,
    pub jti: String,          // JWT ID
    pub iat: i64,             // Issued at time
    pub exp: i64,             // Expiration time
    pub nbf: i64,             // Not valid before time
    pub iss: String,          // Issuer
    pub aud: String,          // Audience
}

/// Authenticated user data extracted from the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub token_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn actor(&self) -> Actor {
        Actor::from(self)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
    pub admin_emails: Vec<String>,
    pub cookie_secure: bool,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration_secs),
            admin_emails: cfg.admin_email_list(),
            cookie_secure: cfg.session_cookie_secure,
        }
    }
}

/// Authentication service: token issuance, validation and user provisioning
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// ADMIN when the email is on the allow-list, otherwise USER
    pub fn role_for(&self, email: &str) -> Role {
        let email = email.trim().to_lowercase();
        if self.config.admin_emails.iter().any(|e| *e == email) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Creates the user on first login and re-syncs the role on every later one.
    pub async fn provision_user(
        &self,
        email: &str,
        name: &str,
    ) -> Result<app_user::Model, AuthError> {
        let email = email.trim().to_lowercase();
        let role = self.role_for(&email);
        let db = self.db.as_ref();

        match AppUserRepository::find_by_email(db, &email).await? {
            Some(user) if !user.enabled => Err(AuthError::AccountDisabled),
            Some(user) if user.role != role => {
                info!(%email, from = %user.role, to = %role, "re-syncing user role");
                Ok(AppUserRepository::update_role(db, user, role).await?)
            }
            Some(user) => Ok(user),
            None => {
                info!(%email, %role, "provisioning new user");
                let user = app_user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email),
                    name: Set(name.trim().to_string()),
                    role: Set(role),
                    enabled: Set(true),
                    created_at: Set(Utc::now()),
                };
                Ok(AppUserRepository::insert(db, user).await?)
            }
        }
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<app_user::Model>, AuthError> {
        Ok(AppUserRepository::find_by_email(self.db.as_ref(), email).await?)
    }

    /// Issues a session token for a provisioned user
    pub fn issue_token(&self, user: &app_user::Model) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            name: Some(user.name.clone()),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.token_expiration.as_secs() as i64,
            nbf: now,
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// `Set-Cookie` value carrying a fresh session token
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.config.token_expiration.as_secs();
        format!(
            "{}={}; Path=/; HttpOnly;{} SameSite=None; Max-Age={}",
            SESSION_COOKIE,
            token,
            secure_attr(self.config.cookie_secure),
            max_age
        )
    }
}

/// `Set-Cookie` values that expire both session cookies
pub fn expired_session_cookies() -> [String; 2] {
    [SESSION_COOKIE, LEGACY_SESSION_COOKIE].map(|name| {
        format!("{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0", name)
    })
}

fn secure_attr(secure: bool) -> &'static str {
    if secure {
        " Secure;"
    } else {
        ""
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled | Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::MissingAuth => "Unauthorized access".to_string(),
            Self::InvalidToken => "Invalid authentication token".to_string(),
            Self::TokenExpired => "Token has expired".to_string(),
            Self::AccountDisabled => "Account is disabled".to_string(),
            Self::InsufficientPermissions => "Insufficient permissions".to_string(),
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                tracing::error!(error = %self, "authentication failure");
                "Unexpected server error".to_string()
            }
        };

        (status, Json(ErrorResponse::new(status, message))).into_response()
    }
}

/// Authentication middleware that extracts and validates session tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".into())
                .into_response();
        }
    };

    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => return AuthError::MissingAuth.into_response(),
    };

    match auth_service.validate_token(&token) {
        Ok(claims) => {
            let user = AuthUser::from(claims);
            debug!(user = %user.email, role = %user.role, "request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Bearer header first, then the SESSION cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
