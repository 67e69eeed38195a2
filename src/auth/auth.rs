use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::role::Role;
use crate::service::leave_request::Requester;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already verified by auth_middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        ready(AuthUser::from_token(token, &config.jwt_secret).map_err(ErrorUnauthorized))
    }
}

impl AuthUser {
    /// Decodes an access token into the caller it identifies.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, String> {
        let claims = verify_token(token, secret)?;

        if claims.token_type != crate::models::TokenType::Access {
            return Err("Access token required".to_string());
        }

        let role = Role::from_id(claims.role).ok_or_else(|| "Invalid role".to_string())?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_hr_or_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr)
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Admin only".to_string()))
        }
    }

    /// HR, admin or manager.
    pub fn require_approver(&self) -> Result<(), ServiceError> {
        if matches!(self.role, Role::Admin | Role::Hr | Role::Manager) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("HR/Manager/Admin only".to_string()))
        }
    }

    pub fn employee_id(&self) -> Result<u64, ServiceError> {
        self.employee_id
            .ok_or_else(|| ServiceError::Forbidden("No employee profile".to_string()))
    }

    pub fn requester(&self) -> Result<Requester, ServiceError> {
        Ok(Requester {
            user_id: self.user_id,
            employee_id: self.employee_id()?,
        })
    }
}
