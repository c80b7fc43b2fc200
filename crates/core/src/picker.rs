use crate::errors::DomainError;
use crate::roster::Roster;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerState {
    Open,
    Picked(String),
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    Accepted(String),
    /// The label is not offered by any of this picker's menus.
    UnknownLabel(String),
    /// A pick already landed, or the picker expired.
    Closed,
}

/// Paginated single-select menus covering the whole roster. Only the first
/// completed pick across all menus counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterPicker {
    pages: Vec<Vec<String>>,
    state: PickerState,
}

impl RosterPicker {
    pub fn new(roster: &Roster) -> Result<Self, DomainError> {
        let pages = roster.pages();
        if pages.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        Ok(Self { pages, state: PickerState::Open })
    }

    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PickerState::Open
    }

    pub fn picked(&self) -> Option<&str> {
        match &self.state {
            PickerState::Picked(label) => Some(label.as_str()),
            _ => None,
        }
    }

    pub fn pick(&mut self, label: &str) -> PickOutcome {
        if !self.is_open() {
            return PickOutcome::Closed;
        }
        if !self.pages.iter().flatten().any(|offered| offered == label) {
            return PickOutcome::UnknownLabel(label.to_owned());
        }
        self.state = PickerState::Picked(label.to_owned());
        PickOutcome::Accepted(label.to_owned())
    }

    /// Returns `true` only on the first expiry of a still-open picker.
    pub fn time_out(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = PickerState::TimedOut;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{PickOutcome, PickerState, RosterPicker};
    use crate::errors::DomainError;
    use crate::roster::{Roster, RosterEntry};

    #[test]
    fn builtin_roster_builds_three_menus() {
        let picker = RosterPicker::new(&Roster::builtin().expect("roster")).expect("picker");
        assert_eq!(picker.pages().len(), 3);
        assert!(picker.is_open());
    }

    #[test]
    fn empty_roster_cannot_build_a_picker() {
        let roster = Roster::new(Vec::new()).expect("empty roster is structurally valid");
        assert_eq!(RosterPicker::new(&roster), Err(DomainError::EmptyRoster));
    }

    #[test]
    fn first_pick_wins_and_later_picks_are_closed() {
        let mut picker = RosterPicker::new(&Roster::builtin().expect("roster")).expect("picker");

        assert_eq!(picker.pick("🇯🇵 Japan"), PickOutcome::Accepted("🇯🇵 Japan".to_owned()));
        assert_eq!(picker.pick("🇺🇸 America"), PickOutcome::Closed);
        assert_eq!(picker.picked(), Some("🇯🇵 Japan"));
    }

    #[test]
    fn unknown_label_leaves_picker_open() {
        let roster = Roster::new(vec![RosterEntry::new("Day shift", None)]).expect("roster");
        let mut picker = RosterPicker::new(&roster).expect("picker");

        assert_eq!(picker.pick("Night shift"), PickOutcome::UnknownLabel("Night shift".to_owned()));
        assert!(picker.is_open());
    }

    #[test]
    fn timeout_is_idempotent_and_blocks_picks() {
        let mut picker = RosterPicker::new(&Roster::builtin().expect("roster")).expect("picker");

        assert!(picker.time_out());
        assert!(!picker.time_out());
        assert_eq!(picker.state(), &PickerState::TimedOut);
        assert_eq!(picker.pick("🇯🇵 Japan"), PickOutcome::Closed);
    }
}
