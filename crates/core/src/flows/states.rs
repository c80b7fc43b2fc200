use serde::{Deserialize, Serialize};

/// Which way the employee is clocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// User-facing label, also used as the embed title fragment.
    pub fn label(&self) -> &'static str {
        match self {
            Self::In => "ลงชื่อเข้างาน",
            Self::Out => "ลงชื่อออกงาน",
        }
    }

    pub fn action_key(&self) -> &'static str {
        match self {
            Self::In => "clock_in",
            Self::Out => "clock_out",
        }
    }

    pub fn from_action_key(value: &str) -> Option<Self> {
        match value {
            "clock_in" => Some(Self::In),
            "clock_out" => Some(Self::Out),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    AwaitingName,
    AwaitingDirection,
    AwaitingEmployee,
    Complete,
    TimedOut,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::TimedOut)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    NameSubmitted,
    DirectionChosen(Direction),
    EmployeePicked,
    TimeoutElapsed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    ShowDirectionChoice,
    OpenRosterPicker,
    RenderConfirmation,
    DisableControls,
    RestartTimer,
    CancelTimer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
