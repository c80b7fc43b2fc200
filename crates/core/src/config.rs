use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{parse_time_zone, DEFAULT_TIME_ZONE};

pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["timeclock.toml", "config/timeclock.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub clock: ClockConfig,
    pub roster: RosterConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    pub token: SecretString,
    pub command_prefix: String,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct ClockConfig {
    pub timezone: String,
    pub wizard_timeout_secs: u64,
    pub picker_timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct RosterConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub discord_token: Option<String>,
    pub timezone: Option<String>,
    pub roster_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub server_enabled: Option<bool>,
    pub health_check_port: Option<u16>,
    pub wizard_timeout_secs: Option<u64>,
    pub picker_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn is_missing_token(&self) -> bool {
        matches!(self, Self::Validation(message) if message.starts_with("discord.token"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                token: String::new().into(),
                command_prefix: "!".to_string(),
                api_base_url: "https://discord.com/api/v10".to_string(),
            },
            clock: ClockConfig {
                timezone: DEFAULT_TIME_ZONE.to_string(),
                wizard_timeout_secs: 120,
                picker_timeout_secs: 180,
            },
            roster: RosterConfig::default(),
            server: ServerConfig {
                enabled: true,
                bind_address: "0.0.0.0".to_string(),
                health_check_port: 5000,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("timeclock.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(discord) = patch.discord {
            if let Some(discord_token_value) = discord.token {
                self.discord.token = secret_value(discord_token_value);
            }
            if let Some(command_prefix) = discord.command_prefix {
                self.discord.command_prefix = command_prefix;
            }
            if let Some(api_base_url) = discord.api_base_url {
                self.discord.api_base_url = api_base_url;
            }
        }

        if let Some(clock) = patch.clock {
            if let Some(timezone) = clock.timezone {
                self.clock.timezone = timezone;
            }
            if let Some(wizard_timeout_secs) = clock.wizard_timeout_secs {
                self.clock.wizard_timeout_secs = wizard_timeout_secs;
            }
            if let Some(picker_timeout_secs) = clock.picker_timeout_secs {
                self.clock.picker_timeout_secs = picker_timeout_secs;
            }
        }

        if let Some(roster) = patch.roster {
            if let Some(path) = roster.path {
                self.roster.path = Some(path);
            }
        }

        if let Some(server) = patch.server {
            if let Some(enabled) = server.enabled {
                self.server.enabled = enabled;
            }
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let token = read_env("TIMECLOCK_DISCORD_TOKEN").or_else(|| read_env("DISCORD_TOKEN"));
        if let Some(value) = token {
            self.discord.token = secret_value(value);
        }
        if let Some(value) = read_env("TIMECLOCK_DISCORD_COMMAND_PREFIX") {
            self.discord.command_prefix = value;
        }
        if let Some(value) = read_env("TIMECLOCK_DISCORD_API_BASE_URL") {
            self.discord.api_base_url = value;
        }

        let timezone = read_env("TIMECLOCK_TIMEZONE").or_else(|| read_env("TIMEZONE"));
        if let Some(value) = timezone {
            self.clock.timezone = value;
        }
        if let Some(value) = read_env("TIMECLOCK_CLOCK_WIZARD_TIMEOUT_SECS") {
            self.clock.wizard_timeout_secs =
                parse_u64("TIMECLOCK_CLOCK_WIZARD_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("TIMECLOCK_CLOCK_PICKER_TIMEOUT_SECS") {
            self.clock.picker_timeout_secs =
                parse_u64("TIMECLOCK_CLOCK_PICKER_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TIMECLOCK_ROSTER_PATH") {
            self.roster.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("TIMECLOCK_SERVER_ENABLED") {
            self.server.enabled = parse_bool("TIMECLOCK_SERVER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("TIMECLOCK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("TIMECLOCK_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("TIMECLOCK_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        let log_level =
            read_env("TIMECLOCK_LOGGING_LEVEL").or_else(|| read_env("TIMECLOCK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TIMECLOCK_LOGGING_FORMAT").or_else(|| read_env("TIMECLOCK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(discord_token) = overrides.discord_token {
            self.discord.token = secret_value(discord_token);
        }
        if let Some(timezone) = overrides.timezone {
            self.clock.timezone = timezone;
        }
        if let Some(roster_path) = overrides.roster_path {
            self.roster.path = Some(roster_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(enabled) = overrides.server_enabled {
            self.server.enabled = enabled;
        }
        if let Some(port) = overrides.health_check_port {
            self.server.health_check_port = port;
        }
        if let Some(secs) = overrides.wizard_timeout_secs {
            self.clock.wizard_timeout_secs = secs;
        }
        if let Some(secs) = overrides.picker_timeout_secs {
            self.clock.picker_timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_discord(&self.discord)?;
        validate_clock(&self.clock)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_PATHS.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    if discord.token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.token is required. Set DISCORD_TOKEN (or TIMECLOCK_DISCORD_TOKEN) to the bot token from https://discord.com/developers/applications".to_string(),
        ));
    }

    if discord.command_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.command_prefix must not be empty".to_string(),
        ));
    }

    let base_url = discord.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "discord.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_clock(clock: &ClockConfig) -> Result<(), ConfigError> {
    parse_time_zone(&clock.timezone)
        .map_err(|error| ConfigError::Validation(format!("clock.timezone: {error}")))?;

    if clock.wizard_timeout_secs == 0 || clock.picker_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "clock.wizard_timeout_secs and clock.picker_timeout_secs must be greater than zero"
                .to_string(),
        ));
    }

    if clock.picker_timeout_secs < clock.wizard_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "clock.picker_timeout_secs ({}) must be at least clock.wizard_timeout_secs ({})",
            clock.picker_timeout_secs, clock.wizard_timeout_secs
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.enabled && server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    discord: Option<DiscordPatch>,
    clock: Option<ClockPatch>,
    roster: Option<RosterPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    token: Option<String>,
    command_prefix: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClockPatch {
    timezone: Option<String>,
    wizard_timeout_secs: Option<u64>,
    picker_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RosterPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    enabled: Option<bool>,
    bind_address: Option<String>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
