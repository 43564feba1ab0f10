//! Environment-driven configuration

use crate::controller::ResetPolicy;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the document-chat service
    pub base_url: String,
    /// Client-level timeout applied to every request
    pub timeout: Duration,
    /// What to do with local state when the remote reset fails
    pub reset_policy: ResetPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url =
            lookup("DOCCHAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = lookup("DOCCHAT_TIMEOUT_SECS")
            .and_then(|v| match v.parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring unparseable DOCCHAT_TIMEOUT_SECS");
                    None
                }
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let reset_policy = match lookup("DOCCHAT_LOCAL_RESET") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => ResetPolicy::LocalFallback,
            _ => ResetPolicy::RemoteFirst,
        };

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            reset_policy,
        }
    }
}
