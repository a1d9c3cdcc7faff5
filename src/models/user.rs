use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::Role;

/// Portal account. Created by an admin; deactivated, never hard-deleted
/// while referenced by questions or transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    /// Cached running sum of the wallet ledger; the ledger is the
    /// source of truth.
    pub balance: i64,
    /// Cached sum of earning entries.
    pub total_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            is_active: true,
            balance: 0,
            total_earned: 0,
            created_at: Utc::now(),
        }
    }
}
