use crate::api::leave_request::SummaryQuery;
use crate::model::employee::Employee;
use crate::model::leave_request::{
    CreatePtoRequest, DaysOffSummary, LeaveType, PtoRequest, PtoStatus, UpdatePtoRequest,
};
use crate::model::notification::{Notification, NotificationType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM PTO API",
        version = "1.0.0",
        description = r#"
## Paid Time Off

Leave requests and in-app notifications for the HRM system.

### 🔹 Key Features
- **PTO Requests**
  - Request vacation, sick or personal leave against the employee's balances
  - Manager and HR approval flow, with balances deducted on HR approval
  - Per-year summaries of approved days off
- **Notifications**
  - Approvers are notified of new requests, requesters of status changes

### 🔐 Security
Every endpoint expects a **JWT Bearer** access token.
Listing and approving requests is limited to **Admin**, **HR** and department **Managers**.

### 📦 Response Format
`{ "success": bool, "data": ..., "message": string, "error": kind }`
"#,
    ),
    paths(
        crate::api::leave_request::my_requests,
        crate::api::leave_request::all_requests,
        crate::api::leave_request::requests_by_status,
        crate::api::leave_request::employee_requests,
        crate::api::leave_request::department_requests,
        crate::api::leave_request::manager_requests,
        crate::api::leave_request::get_request,
        crate::api::leave_request::my_summary,
        crate::api::leave_request::employee_summary,
        crate::api::leave_request::create_request,
        crate::api::leave_request::update_request,
        crate::api::leave_request::delete_request,
        crate::api::leave_request::reset_balances,

        crate::api::notification::list_notifications,
        crate::api::notification::unread_count,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read
    ),
    components(
        schemas(
            PtoRequest,
            PtoStatus,
            LeaveType,
            CreatePtoRequest,
            UpdatePtoRequest,
            DaysOffSummary,
            SummaryQuery,
            Employee,
            Notification,
            NotificationType
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "PTO request lifecycle APIs"),
        (name = "Notifications", description = "In-app notification APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
