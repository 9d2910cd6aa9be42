pub(crate) mod api;
pub(crate) mod client;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;
pub mod session;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(settings.telemetry())?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(settings, db_pool);

    if state.settings().exam().seed_demo_data {
        match services::demo_data::seed_if_empty(&state).await {
            Ok(true) => tracing::info!("Demo data seeded"),
            Ok(false) => tracing::info!("Demo data already present; skipping seed"),
            Err(err) => tracing::error!(error = %err, "Failed to seed demo data"),
        }
    }

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Riyaziyyat exam service listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}

pub async fn run_exam_client(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = core::config::ClientSettings::load()?;
    telemetry::init_tracing(&settings.telemetry)?;

    client::run(settings, args).await
}
