// Per-tick input snapshot.
//
// The input-polling collaborator fills a `TickInput` once per frame. The sim
// treats it as read-only: the pointer position, whether the pointer was
// clicked this tick (an edge, not a hold), and the three keys of the
// developer combo.

use crate::types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub pointer: Point,
    /// True only on the tick the click happened.
    pub click: bool,
    pub keys: KeyState,
}

/// Keyboard flags for the developer combo: `d` and `e` held, `v` pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub d_held: bool,
    pub e_held: bool,
    pub v_pressed: bool,
}

impl KeyState {
    pub fn dev_combo(&self) -> bool {
        self.d_held && self.e_held && self.v_pressed
    }
}

impl TickInput {
    /// No click, no keys.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A click at `pointer` this tick.
    pub fn click_at(pointer: Point) -> Self {
        Self {
            pointer,
            click: true,
            keys: KeyState::default(),
        }
    }
}
