use super::{
    BalanceKind, NewPtoRequest, NotificationStore, PtoStore, StoreResult, Transition,
};
use crate::config::Allowance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{PtoRequest, PtoStatus};
use crate::model::notification::Notification;
use crate::model::user::User;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: u64,
    requests: Vec<PtoRequest>,
    employees: Vec<Employee>,
    departments: Vec<Department>,
    users: Vec<User>,
    notifications: Vec<Notification>,
}

/// Store kept in process memory, mirroring the MySQL semantics.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl State {
    /// `active_pto_request` mirrors whether any request is still pending.
    fn refresh_active_flag(&mut self, employee_id: u64) {
        let pending = self
            .requests
            .iter()
            .any(|r| r.employee_id == employee_id && r.status == PtoStatus::Pending);
        if let Some(employee) = self.employees.iter_mut().find(|e| e.id == employee_id) {
            employee.active_pto_request = pending;
        }
    }
}

fn newest_first(mut requests: Vec<PtoRequest>) -> Vec<PtoRequest> {
    requests.sort_by(|a, b| b.id.cmp(&a.id));
    requests
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employee(&self, employee: Employee) {
        self.state.lock().unwrap().employees.push(employee);
    }

    pub fn add_department(&self, department: Department) {
        self.state.lock().unwrap().departments.push(department);
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn employee(&self, id: u64) -> Employee {
        self.state
            .lock()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .expect("employee seeded")
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }
}

#[async_trait]
impl PtoStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<PtoRequest>> {
        Ok(newest_first(self.state.lock().unwrap().requests.clone()))
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<PtoRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_status(&self, status: PtoStatus) -> StoreResult<Vec<PtoRequest>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(
            state.requests.iter().filter(|r| r.status == status).cloned().collect(),
        ))
    }

    async fn find_by_employee(&self, employee_id: u64) -> StoreResult<Vec<PtoRequest>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(
            state
                .requests
                .iter()
                .filter(|r| r.employee_id == employee_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_department(&self, department_id: u64) -> StoreResult<Vec<PtoRequest>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(
            state
                .requests
                .iter()
                .filter(|r| r.department_id == Some(department_id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_approved_starting_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<PtoRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.status == PtoStatus::HrApproved
                    && r.start_date >= from
                    && r.start_date <= to
            })
            .cloned()
            .collect())
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        let state = self.state.lock().unwrap();
        Ok(state.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_department(&self, id: u64) -> StoreResult<Option<Department>> {
        let state = self.state.lock().unwrap();
        Ok(state.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn find_department_managed_by(
        &self,
        manager_id: u64,
    ) -> StoreResult<Option<Department>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .departments
            .iter()
            .find(|d| d.manager_id == Some(manager_id))
            .cloned())
    }

    async fn find_user_by_employee(&self, employee_id: u64) -> StoreResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.employee_id == Some(employee_id))
            .cloned())
    }

    async fn find_users_with_roles(&self, role_ids: &[u8]) -> StoreResult<Vec<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| role_ids.contains(&u.role_id) && u.employee_id.is_some())
            .cloned()
            .collect())
    }

    async fn insert_request(&self, request: &NewPtoRequest) -> StoreResult<PtoRequest> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;

        let saved = PtoRequest {
            id: state.next_id,
            employee_id: request.employee_id,
            approver_id: None,
            department_id: request.department_id,
            start_date: request.start_date,
            end_date: request.end_date,
            leave_type: request.leave_type.clone(),
            status: PtoStatus::Pending,
            reason: request.reason.clone(),
            status_reason: None,
            created_at: Utc::now(),
        };
        state.requests.push(saved.clone());

        if let Some(employee) = state
            .employees
            .iter_mut()
            .find(|e| e.id == request.employee_id)
        {
            employee.active_pto_request = true;
        }

        Ok(saved)
    }

    async fn apply_transition(&self, transition: &Transition) -> StoreResult<bool> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.id == transition.request_id)
        else {
            return Ok(false);
        };
        if request.status != transition.expected_status {
            return Ok(false);
        }

        request.status = transition.status;
        if transition.status_reason.is_some() {
            request.status_reason = transition.status_reason.clone();
        }
        if transition.department_id.is_some() {
            request.department_id = transition.department_id;
        }
        if transition.approver_id.is_some() {
            request.approver_id = transition.approver_id;
        }

        if let Some(deduction) = transition.deduction {
            if let Some(employee) = state
                .employees
                .iter_mut()
                .find(|e| e.id == transition.employee_id)
            {
                match deduction.balance {
                    Some(BalanceKind::Vacation) => employee.vacation_days_balance -= deduction.days,
                    Some(BalanceKind::Sick) => employee.sick_days_balance -= deduction.days,
                    None => {}
                }
                employee.annual_days_off -= deduction.days;
            }
        }
        state.refresh_active_flag(transition.employee_id);

        Ok(true)
    }

    async fn delete_request(&self, request: &PtoRequest) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.requests.len();
        state.requests.retain(|r| r.id != request.id);
        if state.requests.len() == before {
            return Ok(false);
        }

        state.refresh_active_flag(request.employee_id);
        Ok(true)
    }

    async fn reset_balances(&self, allowance: &Allowance) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        for employee in state.employees.iter_mut() {
            employee.annual_days_off = allowance.annual_days;
            employee.vacation_days_balance = allowance.vacation_days;
            employee.sick_days_balance = allowance.sick_days;
        }
        Ok(state.employees.len() as u64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn notifications_for(&self, recipient_id: u64) -> StoreResult<Vec<Notification>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, recipient_id: u64) -> StoreResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count() as i64)
    }

    async fn mark_read(&self, id: &str, recipient_id: u64) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: u64) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
