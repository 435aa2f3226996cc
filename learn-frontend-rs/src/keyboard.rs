use serde::{Deserialize, Serialize};

/// Keys the study view reacts to, named after `KeyboardEvent.key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    Enter,
    S,
}

impl Key {
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowLeft" => Some(Key::ArrowLeft),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "s" | "S" => Some(Key::S),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum StudyCommand {
    Next,
    Prev,
    Flip,
    MarkRead,
    ToggleStar,
}

/// The key table in force while a card is on screen. A session only holds one while it is
/// viewing, so keys cannot reach a session that is idle or complete.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    table: &'static [(Key, StudyCommand)],
}

const STUDY_KEYS: &[(Key, StudyCommand)] = &[
    (Key::ArrowRight, StudyCommand::Next),
    (Key::ArrowLeft, StudyCommand::Prev),
    (Key::Space, StudyCommand::Flip),
    (Key::Enter, StudyCommand::MarkRead),
    (Key::S, StudyCommand::ToggleStar),
];

impl KeyBindings {
    pub fn study() -> Self {
        Self { table: STUDY_KEYS }
    }

    pub fn command_for(&self, key: Key) -> Option<StudyCommand> {
        self.table
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| *command)
    }
}

/// What the page should do with the DOM event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct KeyOutcome {
    pub handled: bool,
    /// Space would otherwise scroll the page.
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub const IGNORED: KeyOutcome = KeyOutcome {
        handled: false,
        prevent_default: false,
    };
}
