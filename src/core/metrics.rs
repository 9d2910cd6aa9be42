use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_submission_created(cheating_detected: bool) {
    metrics::counter!(
        "submissions_created_total",
        "cheating" => if cheating_detected { "true" } else { "false" }
    )
    .increment(1);
}

pub(crate) fn record_cheating_flag_cleared() {
    metrics::counter!("cheating_flags_cleared_total").increment(1);
}
