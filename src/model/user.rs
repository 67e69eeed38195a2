use serde::{Deserialize, Serialize};

/// Login account; only the columns needed to resolve notification recipients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
}
