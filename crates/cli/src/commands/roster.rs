use std::path::Path;

use timeclock_core::config::{AppConfig, LoadOptions};
use timeclock_core::Roster;

use super::CommandResult;

/// An explicit `path` wins over `roster.path`. Config validation errors are
/// not fatal here: the roster can be inspected before a token is configured.
pub fn run(path: Option<&Path>) -> CommandResult {
    let configured = AppConfig::load(LoadOptions::default())
        .ok()
        .and_then(|config| config.roster.path);
    let path = path.or(configured.as_deref());

    let roster = match Roster::load(path) {
        Ok(roster) => roster,
        Err(error) => {
            return CommandResult::failure("roster", "roster_invalid", error.to_string(), 2);
        }
    };

    let source = path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    let pages = roster.pages();
    let mut lines = vec![format!(
        "roster: {} employees across {} menus (source: {source})",
        roster.len(),
        pages.len()
    )];

    for (index, page) in pages.iter().enumerate() {
        lines.push(format!("menu {} ({} options):", index + 1, page.len()));
        for label in page {
            let marker = if roster.image_url(label).is_some() { "image" } else { "no image" };
            lines.push(format!("  - {label} [{marker}]"));
        }
    }

    CommandResult::text(lines.join("\n"))
}
