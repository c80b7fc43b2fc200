use std::sync::Arc;

use thiserror::Error;
use timeclock_core::config::{AppConfig, ConfigError};
use timeclock_core::time::SystemClock;
use timeclock_core::{DomainError, Roster};
use timeclock_discord::{
    default_dispatcher, ClockWizard, DiscordHttp, GatewayRunner, NoopGatewayTransport,
    ReconnectPolicy, RestDiscordHttp, WizardSettings,
};
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub wizard: Arc<ClockWizard>,
    pub gateway_runner: GatewayRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("roster could not be loaded: {0}")]
    Roster(#[source] DomainError),
    #[error("clock settings are invalid: {0}")]
    ClockSettings(#[source] DomainError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let roster = Roster::load(config.roster.path.as_deref()).map_err(BootstrapError::Roster)?;
    info!(
        event_name = "system.bootstrap.roster_loaded",
        correlation_id = "bootstrap",
        employees = roster.len(),
        pages = roster.pages().len(),
        source = if config.roster.path.is_some() { "file" } else { "builtin" },
        "roster loaded"
    );

    let settings =
        WizardSettings::from_config(&config.clock).map_err(BootstrapError::ClockSettings)?;
    let http: Arc<dyn DiscordHttp> = Arc::new(RestDiscordHttp::new(
        config.discord.api_base_url.clone(),
        config.discord.token.clone(),
    ));
    let wizard = ClockWizard::new(Arc::new(roster), settings, http, Arc::new(SystemClock));
    let dispatcher = default_dispatcher(Arc::clone(&wizard), &config.discord.command_prefix);
    let gateway_runner = GatewayRunner::new(
        Arc::new(NoopGatewayTransport),
        dispatcher,
        ReconnectPolicy::default(),
    );

    Ok(Application { config, wizard, gateway_runner })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use timeclock_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use timeclock_core::DomainError;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    fn config(overrides: ConfigOverrides) -> AppConfig {
        AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                discord_token: Some("bot-token".to_string()),
                ..overrides
            },
            ..LoadOptions::default()
        })
        .expect("config should load with a token override")
    }

    #[test]
    fn config_load_fails_fast_without_token() {
        let mut config = AppConfig::default();
        config.discord.token = String::new().into();

        let error = config.validate().expect_err("blank token should be rejected");
        assert!(error.is_missing_token());
        assert!(error.to_string().contains("DISCORD_TOKEN"));
    }

    #[tokio::test]
    async fn bootstrap_wires_builtin_roster_and_noop_gateway() {
        let app = bootstrap_with_config(config(ConfigOverrides::default()))
            .expect("bootstrap should succeed");

        assert!(app.gateway_runner.is_noop_transport());
        assert_eq!(app.wizard.session_count().await, 0);
        assert_eq!(app.wizard.settings().wizard_timeout.as_secs(), 120);
    }

    #[test]
    fn empty_roster_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# no employees").expect("write");

        let result = bootstrap_with_config(config(ConfigOverrides {
            roster_path: Some(file.path().to_path_buf()),
            ..ConfigOverrides::default()
        }));

        assert!(matches!(result, Err(BootstrapError::Roster(DomainError::EmptyRoster))));
    }
}
