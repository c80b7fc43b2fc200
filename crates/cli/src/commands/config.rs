use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use timeclock_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "discord.token",
        &redact_token(config.discord.token.expose_secret()),
        source("discord.token", &["TIMECLOCK_DISCORD_TOKEN", "DISCORD_TOKEN"]),
    ));
    lines.push(render_line(
        "discord.command_prefix",
        &config.discord.command_prefix,
        source("discord.command_prefix", &["TIMECLOCK_DISCORD_COMMAND_PREFIX"]),
    ));
    lines.push(render_line(
        "discord.api_base_url",
        &config.discord.api_base_url,
        source("discord.api_base_url", &["TIMECLOCK_DISCORD_API_BASE_URL"]),
    ));

    lines.push(render_line(
        "clock.timezone",
        &config.clock.timezone,
        source("clock.timezone", &["TIMECLOCK_TIMEZONE", "TIMEZONE"]),
    ));
    lines.push(render_line(
        "clock.wizard_timeout_secs",
        &config.clock.wizard_timeout_secs.to_string(),
        source("clock.wizard_timeout_secs", &["TIMECLOCK_CLOCK_WIZARD_TIMEOUT_SECS"]),
    ));
    lines.push(render_line(
        "clock.picker_timeout_secs",
        &config.clock.picker_timeout_secs.to_string(),
        source("clock.picker_timeout_secs", &["TIMECLOCK_CLOCK_PICKER_TIMEOUT_SECS"]),
    ));

    let roster_path = config
        .roster
        .path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    lines.push(render_line(
        "roster.path",
        &roster_path,
        source("roster.path", &["TIMECLOCK_ROSTER_PATH"]),
    ));

    lines.push(render_line(
        "server.enabled",
        &config.server.enabled.to_string(),
        source("server.enabled", &["TIMECLOCK_SERVER_ENABLED"]),
    ));
    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["TIMECLOCK_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
        source("server.health_check_port", &["TIMECLOCK_SERVER_HEALTH_CHECK_PORT"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["TIMECLOCK_LOGGING_LEVEL", "TIMECLOCK_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["TIMECLOCK_LOGGING_FORMAT", "TIMECLOCK_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Bot tokens are `<id>.<timestamp>.<hmac>`; only the id segment is shown.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('.') {
        return format!("{prefix}.***");
    }

    "<redacted>".to_string()
}
