//! Session-token authentication.
//!
//! `POST /auth/login/{role}` issues an opaque bearer token that
//! resolves to `{email, role}`. The token is the sole authorization
//! input to every core operation: handlers receive an explicit
//! authenticated user, never ambient state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};
use crate::store::Store;

/// One live login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

pub struct AuthService {
    store: Arc<Store>,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl AuthService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Verify credentials for the role-specific login page and issue a
    /// token. Wrong password, unknown email, deactivated account and
    /// role mismatch are all `Unauthorized`; the login form gets no
    /// detail to enumerate accounts with.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> AppResult<String> {
        let user = {
            let db = self.store.read().await;
            let user = db.user_by_email(email).ok_or(AppError::Unauthorized)?;
            if !user.is_active
                || user.role != role
                || user.password_hash != hash_password(password)
            {
                return Err(AppError::Unauthorized);
            }
            user.clone()
        };

        let token = Uuid::new_v4();
        self.sessions.write().await.insert(
            token,
            Session {
                user_id: user.id,
                email: user.email.clone(),
                role: user.role,
                issued_at: Utc::now(),
            },
        );
        info!("✓ {} logged in as {}", user.email, user.role);
        Ok(token.to_string())
    }

    /// Resolve a bearer token to its user. Fails with `Unauthorized`
    /// for unknown tokens and for sessions whose account was
    /// deactivated after login.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let token: Uuid = token.parse().map_err(|_| AppError::Unauthorized)?;
        let session = self
            .sessions
            .read()
            .await
            .get(&token)
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        let db = self.store.read().await;
        let user = db.user(session.user_id).map_err(|_| AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user.clone())
    }
}

/// Password digest used at account creation and login.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
