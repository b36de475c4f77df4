use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Empty disables admin access.
    pub admin_token: String,
    /// Empty disables clerk access.
    pub clerk_token: String,
    /// `token:account_id` pairs for customer callers.
    pub customer_tokens: Vec<(String, String)>,
    pub notify_webhook_url: String,
    pub notify_webhook_secret: String,
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
    pub day_tour_checkout_hour: u32,
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "cottagebook.db".to_string()),
            admin_token: lookup("ADMIN_TOKEN").unwrap_or_default(),
            clerk_token: lookup("CLERK_TOKEN").unwrap_or_default(),
            customer_tokens: lookup("CUSTOMER_TOKENS")
                .map(|v| parse_pairs(&v))
                .unwrap_or_default(),
            notify_webhook_url: lookup("NOTIFY_WEBHOOK_URL").unwrap_or_default(),
            notify_webhook_secret: lookup("NOTIFY_WEBHOOK_SECRET").unwrap_or_default(),
            store_timeout: Duration::from_millis(number("STORE_TIMEOUT_MS", 5_000)),
            notify_timeout: Duration::from_millis(number("NOTIFY_TIMEOUT_MS", 10_000)),
            day_tour_checkout_hour: number("DAY_TOUR_CHECKOUT_HOUR", 18).min(23) as u32,
            sweep_interval: Duration::from_secs(number("SWEEP_INTERVAL_SECS", 60).max(1)),
        }
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, account) = pair.trim().split_once(':')?;
            let (token, account) = (token.trim(), account.trim());
            if token.is_empty() || account.is_empty() {
                return None;
            }
            Some((token.to_string(), account.to_string()))
        })
        .collect()
}
