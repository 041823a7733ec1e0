use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://mindicador.cl/api";

/// Wait limit for a single-date historical lookup.
pub const DATE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);
/// Yearly lookups return a whole year of points, so they get longer.
pub const YEAR_LOOKUP_TIMEOUT: Duration = Duration::from_secs(90);

/// Settings for [`crate::Client::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("infodivisas/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Per-workflow wait limits for historical lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTimeouts {
    pub by_date: Duration,
    pub by_year: Duration,
}

impl Default for LookupTimeouts {
    fn default() -> Self {
        Self {
            by_date: DATE_LOOKUP_TIMEOUT,
            by_year: YEAR_LOOKUP_TIMEOUT,
        }
    }
}
