use serde::{Deserialize, Serialize};

use crate::note::{InputType, Lane};

/// Every action a player can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    Block,
    LeftUppercut,
    LeftHook,
    RightUppercut,
    RightHook,
}

impl InputAction {
    pub const ALL: [InputAction; 5] = [
        InputAction::Block,
        InputAction::LeftUppercut,
        InputAction::LeftHook,
        InputAction::RightUppercut,
        InputAction::RightHook,
    ];

    pub fn lane(self) -> Lane {
        self.resolve().0
    }

    pub fn input_type(self) -> InputType {
        self.resolve().1
    }

    /// The (lane, type) pair judged for this action.
    pub fn resolve(self) -> (Lane, InputType) {
        match self {
            Self::Block => (Lane::Left, InputType::Block),
            Self::LeftUppercut => (Lane::Left, InputType::Uppercut),
            Self::LeftHook => (Lane::Left, InputType::Hook),
            Self::RightUppercut => (Lane::Right, InputType::Uppercut),
            Self::RightHook => (Lane::Right, InputType::Hook),
        }
    }

    /// Default keyboard binding.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'f' => Some(Self::Block),
            'k' => Some(Self::LeftUppercut),
            's' => Some(Self::LeftHook),
            'd' => Some(Self::RightUppercut),
            'l' => Some(Self::RightHook),
            _ => None,
        }
    }

    /// Action that exactly answers a note, if any.
    pub fn for_note(lane: Lane, input_type: InputType) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.resolve() == (lane, input_type))
    }
}
