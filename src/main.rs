//! Binary entry point: load configuration, start file logging, open the
//! store, and drive the Ratatui event loop until the user exits.
use std::time::Duration;

use equipment_tracker::{logging, open_database, run_app, AdminGate, App, AppConfig, Session};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = logging::init(&config.logging)?;
    tracing::info!("starting equipment tracker v{}", env!("CARGO_PKG_VERSION"));
    if config.uses_default_passphrase() {
        tracing::warn!("admin passphrase is still the shipped default");
    }

    let conn = open_database(&config.database.path)?;
    let session = Session::new(AdminGate::new(config.admin.passphrase.clone()));
    let mut app = App::new(
        conn,
        session,
        config.dashboard.recent_limit,
        Duration::from_secs(config.ui.toast_seconds),
    );

    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = ?err, "terminal session ended with an error");
    }
    result
}
