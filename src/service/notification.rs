use crate::error::ServiceError;
use crate::model::leave_request::PtoRequest;
use crate::model::notification::{Notification, NotificationPayload, NotificationType};
use crate::store::NotificationStore;
use serde_json::json;
use std::sync::Arc;

/// "New PTO Request" sent to each HR/admin user and the department manager.
pub fn pto_request_created(
    request: &PtoRequest,
    requester_name: &str,
    sender_id: Option<u64>,
    recipient_id: u64,
) -> NotificationPayload {
    NotificationPayload {
        recipient_id,
        sender_id,
        notification_type: NotificationType::PtoRequestCreated,
        title: "New PTO Request".to_string(),
        content: format!("{requester_name} has submitted a PTO request"),
        data: Some(json!({
            "requestId": request.id,
            "employeeId": request.employee_id,
            "employeeName": requester_name,
            "startDate": request.start_date,
            "endDate": request.end_date,
            "reason": request.reason,
        })),
    }
}

/// "PTO Request Status Update" sent to the requester.
pub fn pto_request_status_update(
    request: &PtoRequest,
    recipient_id: u64,
    sender_id: Option<u64>,
) -> NotificationPayload {
    NotificationPayload {
        recipient_id,
        sender_id,
        notification_type: NotificationType::PtoRequestStatus,
        title: "PTO Request Status Update".to_string(),
        content: format!("Your PTO request has been {}", request.status.label()),
        data: Some(json!({
            "requestId": request.id,
            "status": request.status,
            "startDate": request.start_date,
            "endDate": request.end_date,
        })),
    }
}

/// Persists notifications and serves each user's inbox.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn create_notification(
        &self,
        payload: NotificationPayload,
    ) -> Result<Notification, ServiceError> {
        let notification = Notification::from_payload(payload);
        self.store.insert_notification(&notification).await?;

        tracing::debug!(
            notification_id = %notification.id,
            recipient_id = notification.recipient_id,
            kind = %notification.notification_type,
            "Notification stored"
        );
        Ok(notification)
    }

    /// Delivers every payload; failures are logged and counted, never raised.
    pub async fn dispatch_all(&self, payloads: Vec<NotificationPayload>) -> usize {
        let results =
            futures::future::join_all(payloads.into_iter().map(|p| self.create_notification(p)))
                .await;

        let mut delivered = 0;
        for result in results {
            match result {
                Ok(_) => delivered += 1,
                Err(e) => tracing::error!(error = %e, "Failed to deliver notification"),
            }
        }
        delivered
    }

    pub async fn inbox(&self, recipient_id: u64) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.store.notifications_for(recipient_id).await?)
    }

    pub async fn unread_count(&self, recipient_id: u64) -> Result<i64, ServiceError> {
        Ok(self.store.unread_count(recipient_id).await?)
    }

    pub async fn mark_as_read(&self, id: &str, recipient_id: u64) -> Result<(), ServiceError> {
        if self.store.mark_read(id, recipient_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Notification"))
        }
    }

    pub async fn mark_all_as_read(&self, recipient_id: u64) -> Result<u64, ServiceError> {
        Ok(self.store.mark_all_read(recipient_id).await?)
    }
}
