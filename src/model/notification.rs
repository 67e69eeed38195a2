use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};
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
pub enum NotificationType {
    #[serde(rename = "pto_created")]
    #[strum(serialize = "pto_created")]
    PtoRequestCreated,
    #[serde(rename = "pto_request_status")]
    #[strum(serialize = "pto_request_status")]
    PtoRequestStatus,
}

impl TryFrom<String> for NotificationType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a caller asks the dispatcher to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub recipient_id: u64,
    pub sender_id: Option<u64>,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    #[schema(example = "1b4e28ba-2fa1-11d2-883f-0016d3cca427")]
    pub id: String,
    /// user id of the recipient
    pub recipient_id: u64,
    #[schema(nullable = true)]
    pub sender_id: Option<u64>,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    #[schema(value_type = Object, nullable = true)]
    pub data: Option<Value>,
    pub read: bool,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_payload(payload: NotificationPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_id: payload.recipient_id,
            sender_id: payload.sender_id,
            notification_type: payload.notification_type,
            title: payload.title,
            content: payload.content,
            data: payload.data,
            read: false,
            created_at: Utc::now(),
        }
    }
}
