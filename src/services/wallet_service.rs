//! Wallet ledger - services layer
//!
//! The ledger is append-only; balances are running sums. Payouts are
//! admin-triggered and idempotent against duplicate submission via a
//! client-supplied request id.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{TransactionKind, WalletTransaction};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct BalanceReport {
    pub user: Uuid,
    pub balance: i64,
    pub total_earned: i64,
}

pub struct WalletService {
    store: Arc<Store>,
}

impl WalletService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Balance recomputed from the ledger (the cached field on the
    /// user is a convenience, not the source of truth).
    pub async fn balance(&self, user_id: Uuid) -> AppResult<BalanceReport> {
        let db = self.store.read().await;
        db.user(user_id)?;

        let mut balance = 0;
        let mut total_earned = 0;
        for transaction in db.transactions_for(user_id) {
            balance += transaction.signed_amount();
            if transaction.kind == TransactionKind::Earning {
                total_earned += transaction.amount;
            }
        }
        Ok(BalanceReport {
            user: user_id,
            balance,
            total_earned,
        })
    }

    /// Full transaction history, newest first.
    pub async fn transactions(&self, user_id: Uuid) -> AppResult<Vec<WalletTransaction>> {
        let db = self.store.read().await;
        db.user(user_id)?;
        let mut entries: Vec<WalletTransaction> =
            db.transactions_for(user_id).cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Append a payout entry. The balance check and the append happen
    /// in one write section; a repeated `request_id` returns the
    /// original entry without touching the ledger.
    pub async fn payout(
        &self,
        user_id: Uuid,
        amount: i64,
        description: String,
        request_id: Uuid,
    ) -> AppResult<WalletTransaction> {
        if amount <= 0 {
            return Err(AppError::validation("amount", "payout amount must be positive"));
        }

        let mut db = self.store.write().await;
        let user = db.user(user_id)?;
        if user.balance < amount {
            return Err(AppError::validation(
                "amount",
                format!(
                    "payout of {} exceeds available balance {}",
                    amount, user.balance
                ),
            ));
        }

        let entry = db.apply_transaction(WalletTransaction {
            id: Uuid::new_v4(),
            user: user_id,
            amount,
            kind: TransactionKind::Payout,
            description,
            request_id: Some(request_id),
            created_at: Utc::now(),
        })?;

        info!("[user {}] ✓ payout of {} recorded", user_id, amount);
        Ok(entry)
    }
}
