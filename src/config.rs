use crate::error::Error;
use std::env;
use std::str::FromStr;
use url::Url;

/// Environment mode. Fixed for the process lifetime at startup; there is
/// no runtime transition between the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            other => Err(Error::Configuration(format!(
                "FARNELL_ENVIRONMENT must be 'production' or 'sandbox', got '{}'",
                other
            ))),
        }
    }
}

/// Runtime configuration for the Partner API clients.
/// Values are sourced from environment variables with sensible defaults,
/// loaded once at startup; the gateway never reads the environment again.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub store_id: String,
    pub environment: Environment,
    pub timeout_secs: u64,
    pub sandbox_username: Option<String>,
    pub sandbox_password: Option<String>,
    pub search_api_url: String,
    /// Explicit Order API base; when absent the store's brand decides.
    pub order_api_url: Option<String>,
    pub max_retries: u32,
    pub rate_limit_per_sec: f64,
    pub rate_limit_burst: u32,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - FARNELL_API_KEY [required]
    /// - FARNELL_STORE_ID (default: www.newark.com)
    /// - FARNELL_ENVIRONMENT (production|sandbox, default: production)
    /// - FARNELL_API_TIMEOUT_SECS (default: 30)
    /// - FARNELL_SANDBOX_USERNAME / FARNELL_SANDBOX_PASSWORD (sandbox only)
    /// - FARNELL_SEARCH_API_URL (default: https://api.element14.com/catalog/products)
    /// - FARNELL_ORDER_API_URL (default: derived from the store brand)
    /// - FARNELL_MAX_RETRIES (default: 2)
    /// - FARNELL_RATE_LIMIT_PER_SEC (default: 2)
    /// - FARNELL_RATE_LIMIT_BURST (default: 2)
    /// - FARNELL_USER_AGENT (default: farnell-mcp/<version>)
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("FARNELL_API_KEY").map_err(|_| {
            Error::Configuration("FARNELL_API_KEY environment variable is required".into())
        })?;

        let store_id =
            env::var("FARNELL_STORE_ID").unwrap_or_else(|_| "www.newark.com".to_string());
        let environment = env::var("FARNELL_ENVIRONMENT")
            .unwrap_or_else(|_| "production".to_string())
            .parse::<Environment>()?;
        let timeout_secs = numeric_env("FARNELL_API_TIMEOUT_SECS", 30u64)?;
        let sandbox_username = env::var("FARNELL_SANDBOX_USERNAME")
            .ok()
            .filter(|s| !s.is_empty());
        let sandbox_password = env::var("FARNELL_SANDBOX_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        let search_api_url = env::var("FARNELL_SEARCH_API_URL")
            .unwrap_or_else(|_| "https://api.element14.com/catalog/products".to_string());
        let order_api_url = env::var("FARNELL_ORDER_API_URL").ok().filter(|s| !s.is_empty());

        let max_retries = numeric_env("FARNELL_MAX_RETRIES", 2u32)?;
        let rate_limit_per_sec = numeric_env("FARNELL_RATE_LIMIT_PER_SEC", 2.0f64)?;
        let rate_limit_burst = numeric_env("FARNELL_RATE_LIMIT_BURST", 2u32)?;

        let default_ua = format!("farnell-mcp/{}", env!("CARGO_PKG_VERSION"));
        let user_agent = env::var("FARNELL_USER_AGENT").unwrap_or(default_ua);

        let cfg = Self {
            api_key,
            store_id,
            environment,
            timeout_secs,
            sandbox_username,
            sandbox_password,
            search_api_url,
            order_api_url,
            max_retries,
            rate_limit_per_sec,
            rate_limit_burst,
            user_agent,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Startup validation. A misconfigured refill rate is rejected here,
    /// not at call time: the limiter itself has no error path.
    pub fn validate(&self) -> Result<(), Error> {
        if self.rate_limit_per_sec <= 0.0 {
            return Err(Error::Configuration(format!(
                "FARNELL_RATE_LIMIT_PER_SEC must be positive, got {}",
                self.rate_limit_per_sec
            )));
        }
        if self.rate_limit_burst == 0 {
            return Err(Error::Configuration(
                "FARNELL_RATE_LIMIT_BURST must be at least 1".into(),
            ));
        }
        Url::parse(&self.search_api_url).map_err(|e| {
            Error::Configuration(format!("FARNELL_SEARCH_API_URL is not a valid URL: {}", e))
        })?;
        if let Some(order_url) = &self.order_api_url {
            Url::parse(order_url).map_err(|e| {
                Error::Configuration(format!("FARNELL_ORDER_API_URL is not a valid URL: {}", e))
            })?;
        }
        Ok(())
    }

    pub fn is_sandbox(&self) -> bool {
        self.environment == Environment::Sandbox
    }
}

/// Numeric knobs default when unset, but a present-yet-unparseable value
/// is a configuration error, not a silent fallback.
fn numeric_env<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            Error::Configuration(format!("{} must be a number, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
