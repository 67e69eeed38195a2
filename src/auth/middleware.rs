use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::models::ApiResponse;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(ApiResponse::failure(message, "unauthorized"));
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let header_value = req
        .headers()
        .get("Authorization")
        .map(|h| h.to_str().map(str::to_owned));

    let header_value = match header_value {
        Some(Ok(v)) => v,
        Some(Err(_)) => return Ok(unauthorized(req, "Invalid Authorization header encoding")),
        None => return Ok(unauthorized(req, "Missing Authorization header")),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return Ok(unauthorized(req, "Authorization header must start with Bearer")),
    };

    let auth_user = match AuthUser::from_token(token, &config.jwt_secret) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
