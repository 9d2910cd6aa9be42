use std::path::PathBuf;
use std::time::Duration;

use super::parsing::{env_optional, env_or_default, parse_bool, parse_u64};
use super::types::{ConfigError, TelemetrySettings};

/// Settings for the `exam_client` binary. Loaded independently of the server
/// settings so the client never touches the signing key or database config.
#[derive(Debug, Clone)]
pub(crate) struct ClientSettings {
    pub(crate) api_url: String,
    pub(crate) request_timeout: Duration,
    pub(crate) post_submit_delay: Duration,
    pub(crate) state_path: PathBuf,
    pub(crate) telemetry: TelemetrySettings,
}

impl ClientSettings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let api_url = env_or_default("RIYAZIYYAT_API_URL", "http://localhost:8000/api")
            .trim_end_matches('/')
            .to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue { field: "RIYAZIYYAT_API_URL", value: api_url });
        }

        let request_timeout_seconds = parse_u64(
            "RIYAZIYYAT_REQUEST_TIMEOUT_SECONDS",
            env_or_default("RIYAZIYYAT_REQUEST_TIMEOUT_SECONDS", "30"),
        )?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RIYAZIYYAT_REQUEST_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        let post_submit_delay_ms = parse_u64(
            "RIYAZIYYAT_POST_SUBMIT_DELAY_MS",
            env_or_default("RIYAZIYYAT_POST_SUBMIT_DELAY_MS", "1000"),
        )?;

        let state_path = env_optional("RIYAZIYYAT_CLIENT_STATE")
            .map(PathBuf::from)
            .unwrap_or_else(default_state_path);

        let log_level = env_or_default("RIYAZIYYAT_CLIENT_LOG_LEVEL", "warn");
        let json = env_optional("RIYAZIYYAT_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(request_timeout_seconds),
            post_submit_delay: Duration::from_millis(post_submit_delay_ms),
            state_path,
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled: false },
        })
    }
}

fn default_state_path() -> PathBuf {
    let home = env_optional("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".riyaziyyat").join("client.json")
}
