//! Timeclock core: roster, pagination, and the clock wizard state machine.
//!
//! Everything here is platform-agnostic; the Discord surface lives in
//! `timeclock-discord`.

pub mod config;
pub mod confirmation;
pub mod errors;
pub mod flows;
pub mod pagination;
pub mod picker;
pub mod roster;
pub mod session;
pub mod time;

pub use confirmation::Confirmation;
pub use errors::DomainError;
pub use flows::{Direction, FlowAction, FlowEvent, FlowState};
pub use pagination::{paginate, MAX_SELECT_OPTIONS};
pub use picker::{PickOutcome, RosterPicker};
pub use roster::{Roster, RosterEntry};
pub use session::{ClockSession, IgnoreReason, MessageHandle, SessionId, SessionUpdate};
