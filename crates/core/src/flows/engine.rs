use thiserror::Error;

use crate::flows::states::{FlowAction, FlowEvent, FlowState, TransitionOutcome};

pub trait FlowDefinition {
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// name entry → direction choice → roster pick → confirmation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockWizardFlow;

impl FlowDefinition for ClockWizardFlow {
    fn initial_state(&self) -> FlowState {
        FlowState::AwaitingName
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_clock_wizard(current, event)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_clock_wizard(
    current: &FlowState,
    event: &FlowEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        CancelTimer, DisableControls, OpenRosterPicker, RenderConfirmation, RestartTimer,
        ShowDirectionChoice,
    };
    use FlowEvent::{DirectionChosen, EmployeePicked, NameSubmitted, TimeoutElapsed};
    use FlowState::{AwaitingDirection, AwaitingEmployee, AwaitingName, Complete, TimedOut};

    let (to, actions) = match (current, event) {
        (AwaitingName, NameSubmitted) => (AwaitingDirection, vec![ShowDirectionChoice, RestartTimer]),
        (AwaitingDirection, DirectionChosen(_)) => {
            (AwaitingEmployee, vec![OpenRosterPicker, RestartTimer])
        }
        (AwaitingEmployee, EmployeePicked) => (Complete, vec![RenderConfirmation, CancelTimer]),
        (AwaitingName | AwaitingDirection | AwaitingEmployee, TimeoutElapsed) => {
            (TimedOut, vec![DisableControls])
        }
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
}
