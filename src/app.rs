use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::auth::{hash_password, AuthService};
use crate::config::Config;
use crate::models::{Role, User};
use crate::services::{
    CatalogService, ClaimService, ReportService, ReviewQueue, WalletService,
};
use crate::store::Store;
use crate::workflow::QuestionFlow;

/// Shared handler state: the store plus one handle per service.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub auth: Arc<AuthService>,
    pub claims: Arc<ClaimService>,
    pub flow: Arc<QuestionFlow>,
    pub queue: Arc<ReviewQueue>,
    pub reports: Arc<ReportService>,
    pub wallet: Arc<WalletService>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(Store::new());
        Self {
            auth: Arc::new(AuthService::new(store.clone())),
            claims: Arc::new(ClaimService::new(store.clone())),
            flow: Arc::new(QuestionFlow::new(store.clone(), &config)),
            queue: Arc::new(ReviewQueue::new(store.clone(), &config)),
            reports: Arc::new(ReportService::new(store.clone())),
            wallet: Arc::new(WalletService::new(store.clone())),
            catalog: Arc::new(CatalogService::new(store.clone())),
            store,
            config,
        }
    }
}

/// Application entry point: wires the store, the services and the
/// router, seeds the admin account, and serves.
pub struct App {
    state: AppState,
}

impl App {
    /// Build the state and seed the configured admin account.
    pub async fn initialize(config: Config) -> Result<Self> {
        let state = AppState::new(config);

        let admin = User::new(
            state.config.admin_name.clone(),
            state.config.admin_email.clone(),
            hash_password(&state.config.admin_password),
            Role::Admin,
        );
        state.store.write().await.insert_user(admin)?;
        info!("✓ seeded admin account {}", state.config.admin_email);

        Ok(Self { state })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        crate::api::router(self.state.clone())
    }

    /// Bind and serve until interrupted.
    pub async fn run(self) -> Result<()> {
        let address = format!("0.0.0.0:{}", self.state.config.port);
        let router = self.router();

        let listener = TcpListener::bind(&address).await?;
        info!("🚀 question workflow portal listening on {address}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
