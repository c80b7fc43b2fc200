use thiserror::Error;

use crate::flows::FlowTransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("roster has no employees; at least one entry is required to build a picker")]
    EmptyRoster,
    #[error("roster label `{0}` appears more than once")]
    DuplicateRosterLabel(String),
    #[error("roster label must not be blank")]
    BlankRosterLabel,
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("unknown time zone `{0}` (expected an IANA name such as `Asia/Bangkok`)")]
    InvalidTimeZone(String),
    #[error("could not parse roster: {0}")]
    RosterParse(String),
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
}

#[cfg(test)]
mod tests {
    use crate::errors::DomainError;
    use crate::flows::{FlowEvent, FlowState, FlowTransitionError};

    #[test]
    fn empty_roster_message_asks_for_an_entry() {
        assert!(DomainError::EmptyRoster.to_string().contains("at least one entry"));
    }

    #[test]
    fn stale_transitions_surface_through_domain_errors() {
        let error = DomainError::from(FlowTransitionError::InvalidTransition {
            state: FlowState::Complete,
            event: FlowEvent::EmployeePicked,
        });
        assert!(matches!(error, DomainError::FlowTransition(_)));
    }

    #[test]
    fn invalid_time_zone_message_names_the_zone() {
        let error = DomainError::InvalidTimeZone("Mars/Olympus".to_owned());
        assert!(error.to_string().contains("Mars/Olympus"));
    }
}
