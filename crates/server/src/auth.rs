use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use database::{access::Principal, error::ServiceError};
use models::role::Role;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LmsClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    /// "Student" or "Instructor"
    pub role: Option<String>,
}

impl LmsClaims {
    pub fn principal(&self) -> Result<Principal, ApiError> {
        let user_id = self
            .sub
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("Token has no subject".to_string()))?;
        let email = self
            .email
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("Token has no email".to_string()))?;
        let role = self
            .role
            .as_deref()
            .and_then(|role| Role::from_str(role).ok())
            .ok_or_else(|| ServiceError::forbidden("Account has no recognized role"))?;

        Ok(Principal::new(user_id, email, role))
    }
}

/// The authenticated caller, built from the claims the JWT layer stores on the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<LmsClaims>()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        claims.principal().map(CurrentUser)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn claims(role: Option<&str>) -> LmsClaims {
        LmsClaims {
            sub: Some("user-1".to_string()),
            email: Some("user@school.edu".to_string()),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_principal_from_claims() {
        let principal = claims(Some("instructor")).principal().unwrap();
        assert_eq!(principal.role, Role::Instructor);
        assert_eq!(principal.user_id, "user-1");
    }

    #[test]
    fn test_missing_role_is_forbidden() {
        assert!(matches!(
            claims(None).principal(),
            Err(ApiError::Service(ServiceError::Forbidden(_)))
        ));
        assert!(matches!(
            claims(Some("Admin")).principal(),
            Err(ApiError::Service(ServiceError::Forbidden(_)))
        ));
    }

    #[test]
    fn test_missing_subject_is_unauthorized() {
        let anonymous = LmsClaims {
            sub: None,
            ..claims(Some("Student"))
        };
        assert!(matches!(anonymous.principal(), Err(ApiError::Unauthorized(_))));
    }
}
