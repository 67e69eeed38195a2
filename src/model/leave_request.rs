use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PtoStatus {
    /// Awaiting any approver
    Pending,
    /// Approved by HR; the only status that deducts balance
    #[serde(rename = "approved")]
    #[strum(serialize = "approved")]
    HrApproved,
    #[serde(rename = "declined")]
    #[strum(serialize = "declined")]
    HrDeclined,
    ManagerApproved,
    ManagerDeclined,
}

impl PtoStatus {
    /// Statuses that record the acting employee as approver.
    pub fn is_actionable(self) -> bool {
        !matches!(self, PtoStatus::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            PtoStatus::Pending => "Pending",
            PtoStatus::HrApproved => "Approved",
            PtoStatus::HrDeclined => "Declined",
            PtoStatus::ManagerApproved => "Approved by manager",
            PtoStatus::ManagerDeclined => "Declined by manager",
        }
    }
}

impl TryFrom<String> for PtoStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
}

/// Persisted PTO request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PtoRequest {
    #[schema(example = 1)]
    pub id: u64,
    /// requesting employee
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// employee who last actioned the request
    #[schema(example = 7, nullable = true)]
    pub approver_id: Option<u64>,
    /// department of the employee when the request was created
    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = "2026-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    // stored as text; rows written by older clients may carry other types
    #[serde(rename = "type")]
    #[schema(example = "vacation")]
    pub leave_type: String,
    #[sqlx(try_from = "String")]
    pub status: PtoStatus,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(nullable = true)]
    pub status_reason: Option<String>,
    #[schema(example = "2026-05-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePtoRequest {
    #[schema(example = "2026-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type", alias = "leave_type")]
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
}

/// Status transition; unset optional fields keep their stored value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePtoRequest {
    #[schema(example = "approved")]
    pub status: PtoStatus,
    #[schema(example = "Enjoy the break")]
    pub status_reason: Option<String>,
    pub department_id: Option<u64>,
}

/// Approved days off in a year, bucketed by leave type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DaysOffSummary {
    pub vacation: i64,
    pub sick: i64,
    pub personal: i64,
    pub other: i64,
}
