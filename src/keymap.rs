//! Undo/redo key-chord interpretation, decoupled from any host event system.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// A host key-down event reduced to the fields the chords care about.
///
/// `editable_target` is true when the event targets a text-editable element
/// (input, textarea, content-editable); those events are never interpreted.
#[derive(Clone, Debug, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub editable_target: bool,
}

impl KeyEvent {
    /// Ctrl or Cmd, whichever the platform uses.
    pub fn primary_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Map a key event to a history action, if it is one of the chords.
pub fn interpret(event: &KeyEvent) -> Option<HistoryAction> {
    if event.editable_target || !event.primary_modifier() {
        return None;
    }
    match event.key.to_lowercase().as_str() {
        "z" if event.shift => Some(HistoryAction::Redo),
        "z" => Some(HistoryAction::Undo),
        "y" => Some(HistoryAction::Redo),
        _ => None,
    }
}
