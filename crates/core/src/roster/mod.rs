//! Static roster of selectable employee identities.
//!
//! The roster is an ordered label → optional image URL mapping, loaded once at
//! startup and shared read-only. Menu placement follows insertion order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::DomainError;
use crate::pagination::{paginate, MAX_SELECT_OPTIONS};

const DEFAULT_ROSTER_TOML: &str = include_str!("default_roster.toml");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub label: String,
    pub image_url: Option<String>,
}

impl RosterEntry {
    pub fn new(label: impl Into<String>, image_url: Option<&str>) -> Self {
        Self {
            label: label.into(),
            image_url: image_url
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.label.trim().is_empty() {
                return Err(DomainError::BlankRosterLabel);
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(DomainError::DuplicateRosterLabel(entry.label.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The roster shipped with the bot.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_toml_str(DEFAULT_ROSTER_TOML)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DomainError> {
        let document = toml::from_str::<RosterDocument>(raw)
            .map_err(|error| DomainError::RosterParse(error.to_string()))?;
        Self::new(
            document
                .employee
                .into_iter()
                .map(|row| RosterEntry::new(row.label, row.image_url.as_deref()))
                .collect(),
        )
    }

    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            DomainError::RosterParse(format!("could not read `{}`: {error}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads from `path` when given, otherwise the built-in roster, and rejects
    /// an empty result.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let roster = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::builtin()?,
        };
        roster.ensure_not_empty()?;
        Ok(roster)
    }

    pub fn ensure_not_empty(&self) -> Result<(), DomainError> {
        if self.entries.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.label.clone()).collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entry(label).is_some()
    }

    pub fn entry(&self, label: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn image_url(&self, label: &str) -> Option<&str> {
        self.entry(label).and_then(|entry| entry.image_url.as_deref())
    }

    /// Labels split into select-menu sized pages.
    pub fn pages(&self) -> Vec<Vec<String>> {
        // MAX_SELECT_OPTIONS is non-zero, so paginate cannot fail here.
        paginate(&self.labels(), MAX_SELECT_OPTIONS).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct RosterDocument {
    #[serde(default)]
    employee: Vec<RosterRow>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    label: String,
    image_url: Option<String>,
}
