use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee record together with its leave balance ledger.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "department_id": 10,
        "vacation_days_balance": 15,
        "sick_days_balance": 15,
        "annual_days_off": 30,
        "active_pto_request": false
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = 15)]
    pub vacation_days_balance: i32,

    #[schema(example = 15)]
    pub sick_days_balance: i32,

    #[schema(example = 30)]
    pub annual_days_off: i32,

    /// Set while the employee has a pending PTO request
    #[schema(example = false)]
    pub active_pto_request: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
