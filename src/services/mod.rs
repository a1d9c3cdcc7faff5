pub mod catalog_service;
pub mod claim_service;
pub mod report_service;
pub mod review_service;
pub mod wallet_service;

pub use catalog_service::{CatalogService, NewCourse, NewPaper, NewUser};
pub use claim_service::ClaimService;
pub use report_service::{DashboardStats, ReportService, Window};
pub use review_service::{PageOf, QueueFilters, ReviewQueue};
pub use wallet_service::{BalanceReport, WalletService};
