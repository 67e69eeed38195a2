use crate::auth::auth::AuthUser;
use crate::error::ServiceError;
use crate::model::leave_request::{CreatePtoRequest, PtoRequest, PtoStatus, UpdatePtoRequest};
use crate::models::ApiResponse;
use crate::service::leave_request::PtoService;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Calendar year, defaults to the current one
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn forbidden(message: &str) -> actix_web::Error {
    ServiceError::Forbidden(message.to_string()).into()
}

fn list_response(requests: Vec<PtoRequest>, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(requests, message))
}

/* =========================
Queries
========================= */

/// Requests of the calling employee
#[utoipa::path(
    get,
    path = "/api/leave/my-requests",
    responses(
        (status = 200, description = "Caller's PTO requests", body = [PtoRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    service: web::Data<PtoService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let requests = service.find_by_employee(employee_id).await?;
    Ok(list_response(requests, "My PTO requests retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/leave/all",
    responses(
        (status = 200, description = "Every PTO request", body = [PtoRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn all_requests(
    auth: AuthUser,
    service: web::Data<PtoService>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let requests = service.find_all().await?;
    Ok(list_response(requests, "PTO requests retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/leave/status/{status}",
    params(
        ("status" = String, Path, description = "pending, approved, declined, manager_approved or manager_declined")
    ),
    responses(
        (status = 200, description = "PTO requests in the given status", body = [PtoRequest]),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn requests_by_status(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let raw = path.into_inner();
    let status: PtoStatus = raw
        .parse()
        .map_err(|_| ServiceError::Validation(format!("Unknown PTO status: {raw}")))?;

    let requests = service.find_by_status(status).await?;
    Ok(list_response(requests, "PTO requests retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/leave/employee/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee whose requests to list")),
    responses(
        (status = 200, description = "Employee PTO requests", body = [PtoRequest]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn employee_requests(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let requests = service.find_by_employee(path.into_inner()).await?;
    Ok(list_response(requests, "Employee PTO requests retrieved successfully"))
}

/// Requests of a department; managers only see their own department
#[utoipa::path(
    get,
    path = "/api/leave/department/{department_id}",
    params(("department_id" = u64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department PTO requests", body = [PtoRequest]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn department_requests(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let department_id = path.into_inner();

    if !auth.is_hr_or_admin()
        && !service
            .manages_department(auth.employee_id()?, department_id)
            .await?
    {
        return Err(forbidden("Not the manager of this department"));
    }

    let requests = service.find_by_department(department_id).await?;
    Ok(list_response(requests, "Department PTO requests retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/leave/manager/{manager_id}",
    params(("manager_id" = u64, Path, description = "Employee id of the department manager")),
    responses(
        (status = 200, description = "PTO requests of the manager's department", body = [PtoRequest]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee manages no department")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn manager_requests(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let manager_id = path.into_inner();

    if !auth.is_hr_or_admin() && auth.employee_id != Some(manager_id) {
        return Err(forbidden("Managers can only view their own department"));
    }

    let requests = service.find_by_manager(manager_id).await?;
    Ok(list_response(requests, "Department PTO requests retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "PTO request id")),
    responses(
        (status = 200, description = "PTO request found", body = PtoRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "PTO request not found", body = Object, example = json!({
            "success": false,
            "message": "PTO request not found",
            "error": "not_found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_request(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = service.find_by_id(path.into_inner()).await?;

    if auth.employee_id != Some(request.employee_id) {
        auth.require_approver()?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(request, "PTO request retrieved successfully")))
}

/* =========================
Summaries
========================= */

#[utoipa::path(
    get,
    path = "/api/leave/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Caller's approved days off by type", body = crate::model::leave_request::DaysOffSummary),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_summary(
    auth: AuthUser,
    service: web::Data<PtoService>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let year = query.year.unwrap_or_else(current_year);

    let summary = service.calculate_days_off(employee_id, year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary, "Days off summary retrieved successfully")))
}

#[utoipa::path(
    get,
    path = "/api/leave/summary/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee to summarize"),
        SummaryQuery
    ),
    responses(
        (status = 200, description = "Approved days off by type", body = crate::model::leave_request::DaysOffSummary),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn employee_summary(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let year = query.year.unwrap_or_else(current_year);

    let summary = service.calculate_days_off(path.into_inner(), year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary, "Days off summary retrieved successfully")))
}

/* =========================
Lifecycle
========================= */

#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreatePtoRequest,
        description = "PTO request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "PTO request created", body = PtoRequest),
        (status = 400, description = "Invalid date range or insufficient balance", body = Object, example = json!({
            "success": false,
            "message": "Insufficient vacation days balance",
            "error": "insufficient_balance"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_request(
    auth: AuthUser,
    service: web::Data<PtoService>,
    payload: web::Json<CreatePtoRequest>,
) -> actix_web::Result<impl Responder> {
    let requester = auth.requester()?;

    let created = service.create(requester, payload.into_inner()).await.inspect_err(|e| {
        tracing::info!(error = %e, username = %auth.username, "PTO request rejected");
    })?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(created, "PTO request created successfully")))
}

/// Status transition by HR, admin, or the manager of the request's department
#[utoipa::path(
    put,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "PTO request id")),
    request_body = UpdatePtoRequest,
    responses(
        (status = 200, description = "PTO request updated", body = PtoRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "PTO request not found"),
        (status = 409, description = "Request changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_request(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
    payload: web::Json<UpdatePtoRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;
    let id = path.into_inner();

    if !auth.is_hr_or_admin() {
        let request = service.find_by_id(id).await?;
        let manages = match request.department_id {
            Some(department_id) => {
                service
                    .manages_department(auth.employee_id()?, department_id)
                    .await?
            }
            None => false,
        };
        if !manages {
            return Err(forbidden("Not the manager of this department"));
        }
    }

    let change = payload.into_inner();
    let approver_id = if change.status.is_actionable() {
        Some(auth.employee_id()?)
    } else {
        None
    };

    let updated = service.update(id, change, approver_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(updated, "PTO request updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "PTO request id")),
    responses(
        (status = 200, description = "PTO request deleted", body = Object, example = json!({
            "success": true,
            "message": "PTO request deleted successfully"
        })),
        (status = 400, description = "Request already actioned", body = Object, example = json!({
            "success": false,
            "message": "Cannot delete approved or rejected PTO requests",
            "error": "invalid_state"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "PTO request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_request(
    auth: AuthUser,
    service: web::Data<PtoService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let request = service.find_by_id(id).await?;

    if auth.employee_id != Some(request.employee_id) && !auth.is_hr_or_admin() {
        return Err(forbidden("Not your PTO request"));
    }

    if request.status != PtoStatus::Pending && !auth.is_admin() {
        return Err(ServiceError::InvalidState(
            "Cannot delete approved or rejected PTO requests".to_string(),
        )
        .into());
    }

    service.delete(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("PTO request deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/leave/reset-balances",
    responses(
        (status = 200, description = "Balances reset", body = Object, example = json!({
            "success": true,
            "data": { "updated": 42 },
            "message": "PTO balances reset successfully"
        })),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reset_balances(
    auth: AuthUser,
    service: web::Data<PtoService>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let updated = service.reset_balances().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        serde_json::json!({ "updated": updated }),
        "PTO balances reset successfully",
    )))
}
