pub mod engine;
pub mod states;

pub use engine::{ClockWizardFlow, FlowDefinition, FlowEngine, FlowTransitionError};
pub use states::{Direction, FlowAction, FlowEvent, FlowState, TransitionOutcome};
