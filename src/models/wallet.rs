use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit earned from workflow activity (e.g. an approved question)
    Earning,
    /// Admin-triggered withdrawal against the balance
    Payout,
}

/// Append-only ledger entry. Balance is the running sum of signed
/// amounts; history is never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user: Uuid,
    /// Always positive; the sign comes from `kind`.
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
    /// Client-supplied idempotency token for payouts.
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Contribution of this entry to the balance.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Earning => self.amount,
            TransactionKind::Payout => -self.amount,
        }
    }
}
