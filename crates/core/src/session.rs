//! One in-flight clock wizard, scoped to a single `clock` invocation.
//!
//! Fields fill in strictly in the order name → direction → employee. Every
//! mutation goes through the flow engine first; events the engine rejects leave
//! the session untouched and come back as [`SessionUpdate::Ignored`].

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::confirmation::Confirmation;
use crate::flows::{
    ClockWizardFlow, Direction, FlowEngine, FlowEvent, FlowState, FlowTransitionError,
    TransitionOutcome,
};
use crate::roster::Roster;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Where the primary wizard message lives, so it can be edited later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    Transition(FlowTransitionError),
    UnknownEmployee(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    Advanced(TransitionOutcome),
    Completed { outcome: TransitionOutcome, confirmation: Confirmation },
    Ignored(IgnoreReason),
}

impl SessionUpdate {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

#[derive(Clone, Debug)]
pub struct ClockSession {
    id: SessionId,
    invoker_user_id: String,
    channel_id: String,
    state: FlowState,
    captured_name: Option<String>,
    direction: Option<Direction>,
    chosen_label: Option<String>,
    message_handle: Option<MessageHandle>,
    engine: FlowEngine<ClockWizardFlow>,
}

impl ClockSession {
    pub fn new(
        id: SessionId,
        invoker_user_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        let engine = FlowEngine::new(ClockWizardFlow);
        Self {
            id,
            invoker_user_id: invoker_user_id.into(),
            channel_id: channel_id.into(),
            state: engine.initial_state(),
            captured_name: None,
            direction: None,
            chosen_label: None,
            message_handle: None,
            engine,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn invoker_user_id(&self) -> &str {
        &self.invoker_user_id
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn captured_name(&self) -> Option<&str> {
        self.captured_name.as_deref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn chosen_label(&self) -> Option<&str> {
        self.chosen_label.as_deref()
    }

    pub fn message_handle(&self) -> Option<&MessageHandle> {
        self.message_handle.as_ref()
    }

    pub fn attach_message(&mut self, handle: MessageHandle) {
        self.message_handle = Some(handle);
    }

    /// Any text is accepted, including an empty string.
    pub fn submit_name(&mut self, name: impl Into<String>) -> SessionUpdate {
        match self.advance(FlowEvent::NameSubmitted) {
            Ok(outcome) => {
                self.captured_name = Some(name.into());
                SessionUpdate::Advanced(outcome)
            }
            Err(error) => SessionUpdate::Ignored(IgnoreReason::Transition(error)),
        }
    }

    pub fn choose_direction(&mut self, direction: Direction) -> SessionUpdate {
        match self.advance(FlowEvent::DirectionChosen(direction)) {
            Ok(outcome) => {
                self.direction = Some(direction);
                SessionUpdate::Advanced(outcome)
            }
            Err(error) => SessionUpdate::Ignored(IgnoreReason::Transition(error)),
        }
    }

    /// `actor_user_id` is whoever made the pick, which need not be the invoker.
    pub fn pick_employee(
        &mut self,
        label: &str,
        actor_user_id: &str,
        roster: &Roster,
        recorded_at: DateTime<Tz>,
    ) -> SessionUpdate {
        if let Err(error) = self.engine.apply(&self.state, &FlowEvent::EmployeePicked) {
            return SessionUpdate::Ignored(IgnoreReason::Transition(error));
        }
        let Some(entry) = roster.entry(label) else {
            return SessionUpdate::Ignored(IgnoreReason::UnknownEmployee(label.to_owned()));
        };
        let (Some(captured_name), Some(direction)) = (self.captured_name.clone(), self.direction)
        else {
            return SessionUpdate::Ignored(IgnoreReason::Transition(
                FlowTransitionError::InvalidTransition {
                    state: self.state,
                    event: FlowEvent::EmployeePicked,
                },
            ));
        };

        match self.advance(FlowEvent::EmployeePicked) {
            Ok(outcome) => {
                self.chosen_label = Some(entry.label.clone());
                let confirmation = Confirmation {
                    direction,
                    captured_name,
                    employee_label: entry.label.clone(),
                    actor_user_id: actor_user_id.to_owned(),
                    recorded_at,
                    image_url: entry.image_url.clone(),
                };
                SessionUpdate::Completed { outcome, confirmation }
            }
            Err(error) => SessionUpdate::Ignored(IgnoreReason::Transition(error)),
        }
    }

    /// Idempotent: a second expiry, or one after completion, is ignored.
    pub fn time_out(&mut self) -> SessionUpdate {
        match self.advance(FlowEvent::TimeoutElapsed) {
            Ok(outcome) => SessionUpdate::Advanced(outcome),
            Err(error) => SessionUpdate::Ignored(IgnoreReason::Transition(error)),
        }
    }

    fn advance(&mut self, event: FlowEvent) -> Result<TransitionOutcome, FlowTransitionError> {
        let outcome = self.engine.apply(&self.state, &event)?;
        self.state = outcome.to;
        Ok(outcome)
    }
}
