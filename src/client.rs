//! Terminal front end for students: login, exam dashboard and exam sessions.

mod commands;
mod store;
mod terminal;

use crate::core::config::ClientSettings;

pub(crate) async fn run(settings: ClientSettings, args: Vec<String>) -> anyhow::Result<()> {
    let command = commands::Command::parse(&args)?;
    commands::execute(command, &settings).await
}
