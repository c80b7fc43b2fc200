mod bootstrap;
mod health;

use anyhow::Result;
use timeclock_core::config::{AppConfig, LoadOptions};
use tracing::{error, info, warn};

fn init_logging(config: &AppConfig) {
    use timeclock_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(config_error) => {
            // No usable logging config yet; report with defaults.
            init_logging(&AppConfig::default());
            error!(
                event_name = "system.bootstrap.config_invalid",
                correlation_id = "bootstrap",
                missing_token = config_error.is_missing_token(),
                error = %config_error,
                "configuration rejected; refusing to start"
            );
            return Err(config_error.into());
        }
    };
    init_logging(&config);

    let app = match bootstrap::bootstrap_with_config(config) {
        Ok(app) => app,
        Err(bootstrap_error) => {
            error!(
                event_name = "system.bootstrap.failed",
                correlation_id = "bootstrap",
                error = %bootstrap_error,
                "bootstrap failed; refusing to start"
            );
            return Err(bootstrap_error.into());
        }
    };

    if !app.config.server.enabled {
        warn!(
            event_name = "system.health.disabled",
            correlation_id = "bootstrap",
            "health endpoint disabled by configuration"
        );
    } else if let Err(bind_error) =
        health::spawn(&app.config.server.bind_address, app.config.server.health_check_port).await
    {
        warn!(
            event_name = "system.health.bind_failed",
            correlation_id = "bootstrap",
            bind_address = %app.config.server.bind_address,
            port = app.config.server.health_check_port,
            error = %bind_error,
            "health endpoint could not start; continuing without it"
        );
    }

    info!(
        event_name = "system.server.gateway_transport_mode",
        transport_mode = if app.gateway_runner.is_noop_transport() { "noop" } else { "gateway" },
        correlation_id = "bootstrap",
        "gateway runner transport mode initialized"
    );

    app.gateway_runner.start().await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        command_prefix = %app.config.discord.command_prefix,
        active_sessions = app.wizard.session_count().await,
        "timeclock-server started"
    );
    wait_for_shutdown().await?;
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        active_sessions = app.wizard.session_count().await,
        "timeclock-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
