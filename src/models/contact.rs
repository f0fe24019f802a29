use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}
