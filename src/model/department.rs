use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: u64,
    pub name: String,
    /// Employee id of the department manager
    pub manager_id: Option<u64>,
}
