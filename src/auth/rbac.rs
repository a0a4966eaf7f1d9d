/*!
 * # Role-Based Access Control
 *
 * Two roles exist: `ADMIN` and `USER`. Routers declare the role they need with
 * [`AuthRouterExt::with_role`]; services receive the caller as an explicit [`Actor`].
 */

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::str::FromStr;
use tracing::warn;

use super::{auth_middleware, AuthError, AuthUser};
use crate::entities::Role;

/// The authenticated caller as seen by the service layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), crate::errors::ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(crate::errors::ServiceError::Forbidden(
                "Admin role required".to_string(),
            ))
        }
    }
}

impl From<&AuthUser> for Actor {
    fn from(user: &AuthUser) -> Self {
        Actor::new(user.email.clone(), user.role)
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    let required = Role::from_str(&required_role).map_err(|_| {
        AuthError::InternalError(format!("unknown role requirement: {}", required_role))
    })?;

    if user.role != required {
        warn!(user = %user.email, role = %user.role, required = %required, "role check failed");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: Role) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    /// Role check runs after authentication because the outer layer executes first.
    fn with_role(self, role: Role) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_admin_check() {
        assert!(Actor::new("root", Role::Admin).require_admin().is_ok());
        assert!(Actor::new("bob", Role::User).require_admin().is_err());
    }

    #[test]
    fn role_round_trips_through_its_name() {
        assert_eq!(Role::from_str(&Role::Admin.to_string()).unwrap(), Role::Admin);
        assert_eq!(Role::from_str("USER").unwrap(), Role::User);
    }
}
