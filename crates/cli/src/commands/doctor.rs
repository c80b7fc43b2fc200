use serde::Serialize;
use timeclock_core::config::{AppConfig, LoadOptions};
use timeclock_core::time::{parse_time_zone, Clock, SystemClock};
use timeclock_core::Roster;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_roster(&config));
            checks.push(check_time_zone(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["roster_readiness", "time_zone"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_roster(config: &AppConfig) -> DoctorCheck {
    let source = config
        .roster
        .path
        .as_deref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "built-in roster".to_string());

    match Roster::load(config.roster.path.as_deref()) {
        Ok(roster) => {
            let missing_images =
                roster.entries().iter().filter(|entry| entry.image_url.is_none()).count();
            DoctorCheck {
                name: "roster_readiness",
                status: CheckStatus::Pass,
                details: format!(
                    "{} employees across {} menus from {source} ({missing_images} without image)",
                    roster.len(),
                    roster.pages().len()
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "roster_readiness",
            status: CheckStatus::Fail,
            details: format!("{source}: {error}"),
        },
    }
}

fn check_time_zone(config: &AppConfig) -> DoctorCheck {
    match parse_time_zone(&config.clock.timezone) {
        Ok(zone) => DoctorCheck {
            name: "time_zone",
            status: CheckStatus::Pass,
            details: format!(
                "{} (now {})",
                config.clock.timezone,
                SystemClock.now_in(zone).format("%Y-%m-%d %H:%M:%S %Z")
            ),
        },
        Err(error) => {
            DoctorCheck { name: "time_zone", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
