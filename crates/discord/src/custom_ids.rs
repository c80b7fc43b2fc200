//! Component custom ids: `timeclock:<session-id>:<action>`.

use timeclock_core::{Direction, SessionId};

pub const CUSTOM_ID_PREFIX: &str = "timeclock";
pub const NAME_INPUT_ID: &str = "user_name";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardAction {
    EnterName,
    NameModal,
    Direction(Direction),
    Employee { page: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomId {
    pub session_id: SessionId,
    pub action: WizardAction,
}

impl CustomId {
    pub fn new(session_id: SessionId, action: WizardAction) -> Self {
        Self { session_id, action }
    }

    pub fn encode(&self) -> String {
        let action = match self.action {
            WizardAction::EnterName => "enter_name".to_owned(),
            WizardAction::NameModal => "name_modal".to_owned(),
            WizardAction::Direction(direction) => direction.action_key().to_owned(),
            WizardAction::Employee { page } => format!("employee:{page}"),
        };
        format!("{CUSTOM_ID_PREFIX}:{}:{action}", self.session_id)
    }

    /// `None` for ids minted by anything other than this bot.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        if parts.next()? != CUSTOM_ID_PREFIX {
            return None;
        }
        let session_id = parts.next()?.parse::<SessionId>().ok()?;
        let action = match parts.next()? {
            "enter_name" => WizardAction::EnterName,
            "name_modal" => WizardAction::NameModal,
            other => match Direction::from_action_key(other) {
                Some(direction) => WizardAction::Direction(direction),
                None => {
                    let page = other.strip_prefix("employee:")?.parse::<usize>().ok()?;
                    WizardAction::Employee { page }
                }
            },
        };
        Some(Self { session_id, action })
    }
}
