use crate::config::Allowance;
use crate::error::ServiceError;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{
    CreatePtoRequest, DaysOffSummary, PtoRequest, PtoStatus, UpdatePtoRequest,
};
use crate::service::ledger;
use crate::service::notification::{self, NotificationService};
use crate::store::{NewPtoRequest, PtoStore, Transition};
use crate::utils::recipient_cache::RecipientCache;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Authenticated caller creating a request.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: u64,
    pub employee_id: u64,
}

/// PTO request lifecycle: creation against the ledger, status transitions,
/// deletion and yearly summaries. Built once at startup and shared.
#[derive(Clone)]
pub struct PtoService {
    store: Arc<dyn PtoStore>,
    notifications: NotificationService,
    recipients: RecipientCache,
    allowance: Allowance,
}

impl PtoService {
    pub fn new(
        store: Arc<dyn PtoStore>,
        notifications: NotificationService,
        recipients: RecipientCache,
        allowance: Allowance,
    ) -> Self {
        Self {
            store,
            notifications,
            recipients,
            allowance,
        }
    }

    pub async fn find_all(&self) -> Result<Vec<PtoRequest>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_by_id(&self, id: u64) -> Result<PtoRequest, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("PTO request"))
    }

    pub async fn find_by_status(&self, status: PtoStatus) -> Result<Vec<PtoRequest>, ServiceError> {
        Ok(self.store.find_by_status(status).await?)
    }

    pub async fn find_by_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<PtoRequest>, ServiceError> {
        Ok(self.store.find_by_employee(employee_id).await?)
    }

    pub async fn find_by_department(
        &self,
        department_id: u64,
    ) -> Result<Vec<PtoRequest>, ServiceError> {
        Ok(self.store.find_by_department(department_id).await?)
    }

    /// Requests of the department managed by `manager_id`.
    pub async fn find_by_manager(&self, manager_id: u64) -> Result<Vec<PtoRequest>, ServiceError> {
        let department = self
            .store
            .find_department_managed_by(manager_id)
            .await?
            .ok_or(ServiceError::NotFound("Managed department"))?;

        self.find_by_department(department.id).await
    }

    pub async fn manages_department(
        &self,
        employee_id: u64,
        department_id: u64,
    ) -> Result<bool, ServiceError> {
        let department = self.store.find_department(department_id).await?;
        Ok(matches!(department, Some(Department { manager_id: Some(m), .. }) if m == employee_id))
    }

    #[instrument(
        name = "pto_create",
        skip(self, input),
        fields(employee_id = requester.employee_id)
    )]
    pub async fn create(
        &self,
        requester: Requester,
        input: CreatePtoRequest,
    ) -> Result<PtoRequest, ServiceError> {
        if input.start_date > input.end_date {
            return Err(ServiceError::Validation(
                "Start date cannot be greater than end date".to_string(),
            ));
        }

        let employee = self
            .store
            .find_employee(requester.employee_id)
            .await?
            .ok_or(ServiceError::NotFound("Employee"))?;

        let days = ledger::day_count(input.start_date, input.end_date);
        ledger::ensure_covered(&employee, input.leave_type, days)?;

        let saved = self
            .store
            .insert_request(&NewPtoRequest {
                employee_id: employee.id,
                department_id: employee.department_id,
                start_date: input.start_date,
                end_date: input.end_date,
                leave_type: input.leave_type.to_string(),
                reason: input.reason,
            })
            .await?;

        info!(request_id = saved.id, days, leave_type = %input.leave_type, "PTO request created");

        match self.creation_recipients(&employee).await {
            Ok(recipients) => {
                let name = employee.full_name();
                let payloads = recipients
                    .into_iter()
                    .map(|recipient| {
                        notification::pto_request_created(
                            &saved,
                            &name,
                            Some(requester.user_id),
                            recipient,
                        )
                    })
                    .collect();
                let delivered = self.notifications.dispatch_all(payloads).await;
                debug!(request_id = saved.id, delivered, "Creation notifications sent");
            }
            Err(e) => {
                error!(
                    error = %e,
                    request_id = saved.id,
                    "Could not resolve notification recipients"
                )
            }
        }

        Ok(saved)
    }

    /// HR/admin users plus the manager of the employee's department,
    /// without duplicates.
    async fn creation_recipients(&self, employee: &Employee) -> Result<Vec<u64>, ServiceError> {
        let mut recipients: Vec<u64> = self
            .recipients
            .privileged_users(self.store.as_ref())
            .await?
            .to_vec();

        if let Some(department_id) = employee.department_id {
            let manager_id = self
                .store
                .find_department(department_id)
                .await?
                .and_then(|department| department.manager_id);

            if let Some(manager_id) = manager_id {
                if let Some(user) = self.store.find_user_by_employee(manager_id).await? {
                    if !recipients.contains(&user.id) {
                        recipients.push(user.id);
                    }
                }
            }
        }

        Ok(recipients)
    }

    /// Applies a status change. Entering `approved` deducts the inclusive day
    /// count once. An approved request can only be re-approved, which deducts
    /// nothing.
    #[instrument(name = "pto_update", skip(self, change), fields(status = %change.status))]
    pub async fn update(
        &self,
        id: u64,
        change: UpdatePtoRequest,
        approver_id: Option<u64>,
    ) -> Result<PtoRequest, ServiceError> {
        let current = self.find_by_id(id).await?;

        if current.status == PtoStatus::HrApproved && change.status != PtoStatus::HrApproved {
            return Err(ServiceError::InvalidState(
                "Approved PTO requests cannot change status".to_string(),
            ));
        }

        let employee = self
            .store
            .find_employee(current.employee_id)
            .await?
            .ok_or(ServiceError::NotFound("Employee"))?;

        let deduction = (change.status == PtoStatus::HrApproved
            && current.status != PtoStatus::HrApproved)
            .then(|| ledger::deduction_for(&current));

        let transition = Transition {
            request_id: current.id,
            employee_id: employee.id,
            expected_status: current.status,
            status: change.status,
            status_reason: change.status_reason,
            department_id: change.department_id,
            approver_id,
            deduction,
        };

        if !self.store.apply_transition(&transition).await? {
            return Err(ServiceError::Conflict(
                "PTO request was changed by someone else, reload and try again".to_string(),
            ));
        }

        if let Some(deduction) = deduction {
            info!(
                request_id = id,
                employee_id = employee.id,
                days = deduction.days,
                "Leave balance deducted"
            );
        }

        let updated = self.find_by_id(id).await?;

        if updated.status != current.status {
            self.notify_status_change(&updated).await;
        }

        Ok(updated)
    }

    async fn notify_status_change(&self, request: &PtoRequest) {
        let recipient = match self.store.find_user_by_employee(request.employee_id).await {
            Ok(Some(user)) => user.id,
            Ok(None) => {
                debug!(
                    request_id = request.id,
                    "Requester has no user account, skipping notification"
                );
                return;
            }
            Err(e) => {
                error!(error = %e, request_id = request.id, "Could not resolve requester");
                return;
            }
        };

        let sender = match request.approver_id {
            Some(approver_id) => match self.store.find_user_by_employee(approver_id).await {
                Ok(user) => user.map(|u| u.id),
                Err(e) => {
                    error!(error = %e, request_id = request.id, "Could not resolve approver");
                    None
                }
            },
            None => None,
        };

        self.notifications
            .dispatch_all(vec![notification::pto_request_status_update(
                request, recipient, sender,
            )])
            .await;
    }

    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        let request = self.find_by_id(id).await?;

        if !self.store.delete_request(&request).await? {
            return Err(ServiceError::NotFound("PTO request"));
        }

        info!(request_id = id, employee_id = request.employee_id, "PTO request deleted");
        Ok(())
    }

    /// Approved days off for requests starting within `year`.
    pub async fn calculate_days_off(
        &self,
        employee_id: u64,
        year: i32,
    ) -> Result<DaysOffSummary, ServiceError> {
        let (from, to) = NaiveDate::from_ymd_opt(year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(year, 12, 31))
            .ok_or_else(|| ServiceError::Validation(format!("Invalid year {year}")))?;

        let requests = self
            .store
            .find_approved_starting_between(employee_id, from, to)
            .await?;

        Ok(ledger::summarize(&requests))
    }

    pub async fn reset_balances(&self) -> Result<u64, ServiceError> {
        let updated = self.store.reset_balances(&self.allowance).await?;
        info!(updated, "Leave balances reset to yearly allowance");
        Ok(updated)
    }
}
