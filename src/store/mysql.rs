use super::{
    BalanceKind, NewPtoRequest, NotificationStore, PtoStore, StoreResult, Transition,
};
use crate::config::Allowance;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{PtoRequest, PtoStatus};
use crate::model::notification::{Notification, NotificationType};
use crate::model::user::User;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

const PTO_SELECT: &str = r#"
    SELECT id, employee_id, approver_id, department_id, start_date, end_date,
           leave_type, status, reason, status_reason, created_at
    FROM pto_requests
"#;

const EMPLOYEE_SELECT: &str = r#"
    SELECT id, employee_code, first_name, last_name, department_id,
           vacation_days_balance, sick_days_balance, annual_days_off, active_pto_request
    FROM employees
"#;

const NOTIFICATION_SELECT: &str = r#"
    SELECT id, recipient_id, sender_id, notification_type, title, content, data,
           is_read, created_at
    FROM notifications
"#;

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    recipient_id: u64,
    sender_id: Option<u64>,
    #[sqlx(try_from = "String")]
    notification_type: NotificationType,
    title: String,
    content: String,
    data: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        let data = row.data.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    notification_id = %row.id,
                    "Dropping unreadable notification data"
                );
                None
            }
        });

        Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            sender_id: row.sender_id,
            notification_type: row.notification_type,
            title: row.title,
            content: row.content,
            data,
            read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// MySQL backed store. Multi-row writes run in a single transaction.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Sets `active_pto_request` from whether any request is still pending.
    async fn refresh_active_flag(
        tx: &mut Transaction<'_, MySql>,
        employee_id: u64,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE employees
            SET active_pto_request = EXISTS(
                SELECT 1 FROM pto_requests WHERE employee_id = ? AND status = ?
            )
            WHERE id = ?
            "#,
        )
        .bind(employee_id)
        .bind(PtoStatus::Pending.as_ref())
        .bind(employee_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn fetch_requests(&self, filter: &str, value: u64) -> StoreResult<Vec<PtoRequest>> {
        let sql = format!("{PTO_SELECT} WHERE {filter} = ? ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, PtoRequest>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
    }
}

#[async_trait]
impl PtoStore for MySqlStore {
    async fn find_all(&self) -> StoreResult<Vec<PtoRequest>> {
        let sql = format!("{PTO_SELECT} ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, PtoRequest>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<PtoRequest>> {
        let sql = format!("{PTO_SELECT} WHERE id = ?");
        sqlx::query_as::<_, PtoRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_by_status(&self, status: PtoStatus) -> StoreResult<Vec<PtoRequest>> {
        let sql = format!("{PTO_SELECT} WHERE status = ? ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, PtoRequest>(&sql)
            .bind(status.as_ref())
            .fetch_all(&self.pool)
            .await
    }

    async fn find_by_employee(&self, employee_id: u64) -> StoreResult<Vec<PtoRequest>> {
        self.fetch_requests("employee_id", employee_id).await
    }

    async fn find_by_department(&self, department_id: u64) -> StoreResult<Vec<PtoRequest>> {
        self.fetch_requests("department_id", department_id).await
    }

    async fn find_approved_starting_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<PtoRequest>> {
        let sql = format!(
            "{PTO_SELECT} WHERE employee_id = ? AND status = ? AND start_date BETWEEN ? AND ?"
        );
        sqlx::query_as::<_, PtoRequest>(&sql)
            .bind(employee_id)
            .bind(PtoStatus::HrApproved.as_ref())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE id = ?");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_department(&self, id: u64) -> StoreResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT id, name, manager_id FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_department_managed_by(
        &self,
        manager_id: u64,
    ) -> StoreResult<Option<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT id, name, manager_id FROM departments WHERE manager_id = ? ORDER BY id LIMIT 1",
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_employee(&self, employee_id: u64) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, role_id, employee_id FROM users WHERE employee_id = ? LIMIT 1",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_users_with_roles(&self, role_ids: &[u8]) -> StoreResult<Vec<User>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; role_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, username, role_id, employee_id
            FROM users
            WHERE role_id IN ({placeholders})
            AND employee_id IS NOT NULL
            ORDER BY id
            "#
        );

        let mut query = sqlx::query_as::<_, User>(&sql);
        for role_id in role_ids {
            query = query.bind(*role_id);
        }
        query.fetch_all(&self.pool).await
    }

    async fn insert_request(&self, request: &NewPtoRequest) -> StoreResult<PtoRequest> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO pto_requests
                (employee_id, department_id, start_date, end_date, leave_type, status, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.department_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.leave_type)
        .bind(PtoStatus::Pending.as_ref())
        .bind(&request.reason)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE employees SET active_pto_request = TRUE WHERE id = ?")
            .bind(request.employee_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!("{PTO_SELECT} WHERE id = ?");
        let saved = sqlx::query_as::<_, PtoRequest>(&sql)
            .bind(inserted.last_insert_id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn apply_transition(&self, transition: &Transition) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        // lock the row so a concurrent transition waits for this one
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM pto_requests WHERE id = ? FOR UPDATE")
                .bind(transition.request_id)
                .fetch_optional(&mut *tx)
                .await?;

        if current.as_deref() != Some(transition.expected_status.as_ref()) {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE pto_requests
            SET status = ?,
                status_reason = COALESCE(?, status_reason),
                department_id = COALESCE(?, department_id),
                approver_id = COALESCE(?, approver_id)
            WHERE id = ?
            "#,
        )
        .bind(transition.status.as_ref())
        .bind(&transition.status_reason)
        .bind(transition.department_id)
        .bind(transition.approver_id)
        .bind(transition.request_id)
        .execute(&mut *tx)
        .await?;

        if let Some(deduction) = transition.deduction {
            let sql = match deduction.balance {
                Some(BalanceKind::Vacation) => {
                    r#"UPDATE employees
                       SET vacation_days_balance = vacation_days_balance - ?,
                           annual_days_off = annual_days_off - ?
                       WHERE id = ?"#
                }
                Some(BalanceKind::Sick) => {
                    r#"UPDATE employees
                       SET sick_days_balance = sick_days_balance - ?,
                           annual_days_off = annual_days_off - ?
                       WHERE id = ?"#
                }
                None => {
                    r#"UPDATE employees
                       SET annual_days_off = annual_days_off - ?
                       WHERE id = ?"#
                }
            };

            let mut query = sqlx::query(sql).bind(deduction.days);
            if deduction.balance.is_some() {
                query = query.bind(deduction.days);
            }
            query.bind(transition.employee_id).execute(&mut *tx).await?;
        }

        Self::refresh_active_flag(&mut tx, transition.employee_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_request(&self, request: &PtoRequest) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM pto_requests WHERE id = ?")
            .bind(request.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::refresh_active_flag(&mut tx, request.employee_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn reset_balances(&self, allowance: &Allowance) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE employees
            SET annual_days_off = ?, vacation_days_balance = ?, sick_days_balance = ?
            "#,
        )
        .bind(allowance.annual_days)
        .bind(allowance.vacation_days)
        .bind(allowance.sick_days)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl NotificationStore for MySqlStore {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        let data = notification.data.as_ref().map(|value| value.to_string());

        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, recipient_id, sender_id, notification_type, title, content, data, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(notification.recipient_id)
        .bind(notification.sender_id)
        .bind(notification.notification_type.as_ref())
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(data)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn notifications_for(&self, recipient_id: u64) -> StoreResult<Vec<Notification>> {
        let sql = format!("{NOTIFICATION_SELECT} WHERE recipient_id = ? ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(recipient_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn unread_count(&self, recipient_id: u64) -> StoreResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_read(&self, id: &str, recipient_id: u64) -> StoreResult<bool> {
        // MySQL reports changed rows, so check existence separately
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE id = ? AND recipient_id = ?)",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND recipient_id = ?")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    async fn mark_all_read(&self, recipient_id: u64) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = ? AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
