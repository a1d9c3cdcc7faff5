/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Port the HTTP server binds to
    pub port: u16,
    /// Default page size for review queue listings
    pub default_page_size: usize,
    /// Upper bound on the requested page size
    pub max_page_size: usize,
    /// Amount credited to the maker when a question is approved
    pub earning_per_approved_question: i64,
    // --- seed admin account ---
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3050,
            default_page_size: 10,
            max_page_size: 100,
            earning_per_approved_question: 10,
            admin_name: "Administrator".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "change-me".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.port),
            default_page_size: std::env::var("DEFAULT_PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_page_size),
            max_page_size: std::env::var("MAX_PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_page_size),
            earning_per_approved_question: std::env::var("EARNING_PER_APPROVED_QUESTION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.earning_per_approved_question),
            admin_name: std::env::var("ADMIN_NAME").unwrap_or(default.admin_name),
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or(default.admin_email),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or(default.admin_password),
        }
    }
}
