//! Persistence ports for the PTO and notification services.
//!
//! Services only talk to these traits; `MySqlStore` is the production
//! backend, tests run against the in-memory store.

pub mod mysql;

#[cfg(test)]
pub mod memory;

use crate::config::Allowance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{PtoRequest, PtoStatus};
use crate::model::notification::Notification;
use crate::model::user::User;
use async_trait::async_trait;
use chrono::NaiveDate;

pub use mysql::MySqlStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Balance column a deduction is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    Vacation,
    Sick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPtoRequest {
    pub employee_id: u64,
    pub department_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
}

/// Days removed from the ledger when a request is approved by HR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deduction {
    /// `None` for leave types without a balance of their own
    pub balance: Option<BalanceKind>,
    pub days: i32,
}

/// A status change applied atomically with its ledger effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub request_id: u64,
    pub employee_id: u64,
    /// Status read before the change; the write is rejected if it moved.
    pub expected_status: PtoStatus,
    pub status: PtoStatus,
    pub status_reason: Option<String>,
    pub department_id: Option<u64>,
    pub approver_id: Option<u64>,
    pub deduction: Option<Deduction>,
}

#[async_trait]
pub trait PtoStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<PtoRequest>>;
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<PtoRequest>>;
    async fn find_by_status(&self, status: PtoStatus) -> StoreResult<Vec<PtoRequest>>;
    async fn find_by_employee(&self, employee_id: u64) -> StoreResult<Vec<PtoRequest>>;
    async fn find_by_department(&self, department_id: u64) -> StoreResult<Vec<PtoRequest>>;
    /// HR-approved requests of an employee starting inside `[from, to]`.
    async fn find_approved_starting_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<PtoRequest>>;

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn find_department(&self, id: u64) -> StoreResult<Option<Department>>;
    async fn find_department_managed_by(&self, manager_id: u64)
    -> StoreResult<Option<Department>>;
    async fn find_user_by_employee(&self, employee_id: u64) -> StoreResult<Option<User>>;
    /// Users holding one of `role_ids` that are linked to an employee.
    async fn find_users_with_roles(&self, role_ids: &[u8]) -> StoreResult<Vec<User>>;

    /// Inserts a pending request and flags the employee as having one.
    async fn insert_request(&self, request: &NewPtoRequest) -> StoreResult<PtoRequest>;
    /// Returns `false` when the request is gone or its status no longer
    /// equals `expected_status`; nothing is written in that case.
    async fn apply_transition(&self, transition: &Transition) -> StoreResult<bool>;
    /// Deletes the request and recomputes the employee's active flag.
    async fn delete_request(&self, request: &PtoRequest) -> StoreResult<bool>;
    async fn reset_balances(&self, allowance: &Allowance) -> StoreResult<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    async fn notifications_for(&self, recipient_id: u64) -> StoreResult<Vec<Notification>>;
    async fn unread_count(&self, recipient_id: u64) -> StoreResult<i64>;
    async fn mark_read(&self, id: &str, recipient_id: u64) -> StoreResult<bool>;
    async fn mark_all_read(&self, recipient_id: u64) -> StoreResult<u64>;
}
