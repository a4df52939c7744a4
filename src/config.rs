use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Price source
    pub mexc_base_url: String,
    pub fetch_timeout: Duration,

    // Poller
    pub poll_interval: Duration,

    // Persistence
    pub data_dir: String,
    pub state_file: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let data_dir = env("DATA_DIR", "data");
        let state_file = env("STATE_FILE", &format!("{data_dir}/signals.json"));

        Config {
            mexc_base_url: env("MEXC_BASE_URL", "https://contract.mexc.com/api/v1"),
            fetch_timeout: Duration::from_secs(
                env("FETCH_TIMEOUT_SECS", "5").parse().unwrap_or(5),
            ),
            poll_interval: Duration::from_secs(
                env("POLL_INTERVAL_SECS", "5").parse().unwrap_or(5),
            ),
            data_dir,
            state_file,
            log_level: env("LOG_LEVEL", "info"),
        }
    }
}
