mod client;
mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use client::ClientSettings;
pub(crate) use types::{ConfigError, Environment, Settings, TelemetrySettings};
