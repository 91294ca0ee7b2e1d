pub mod error;
pub mod event;
pub mod keymap;
pub mod mapper;
pub mod reader;
pub mod settings;

use std::fmt;

pub use error::{Error, Result};
pub use event::{EventSource, KeyEvent, Tick};
pub use keymap::KeyMap;
pub use mapper::{Mapper, Outcome, Prompt};
pub use reader::{Reader, Resolved};
pub use settings::Settings;

/// Name that turns a key into the shift modifier.
pub const SHIFT_NAME: &str = "shift";

pub fn is_shift_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(SHIFT_NAME)
}

/// Physical switch position as reported by the panel. Both halves are kept as the exact tokens
/// seen on the wire so they survive a save/load unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub row: String,
    pub col: String,
}

impl Coordinate {
    pub fn new(row: impl Into<String>, col: impl Into<String>) -> Self {
        Self { row: row.into(), col: col.into() }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}, Col {}", self.row, self.col)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Normal,
    Shifted,
}

impl Field {
    pub const fn for_shift(held: bool) -> Self {
        if held { Field::Shifted } else { Field::Normal }
    }
}

/// Names attached to a coordinate. An empty string means the layer is unassigned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyBinding {
    pub normal: String,
    pub shifted: String,
}

impl KeyBinding {
    pub fn new(normal: impl Into<String>, shifted: impl Into<String>) -> Self {
        Self { normal: normal.into(), shifted: shifted.into() }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Normal => &self.normal,
            Field::Shifted => &self.shifted,
        }
    }

    pub fn set(&mut self, field: Field, name: impl Into<String>) {
        match field {
            Field::Normal => self.normal = name.into(),
            Field::Shifted => self.shifted = name.into(),
        }
    }

    pub fn is_shift(&self) -> bool {
        is_shift_name(&self.normal)
    }
}

/// Modifier toggle. Never persisted, every session starts released.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftState {
    held: bool,
}

impl ShiftState {
    pub fn toggle(&mut self) -> bool {
        self.held = !self.held;
        self.held
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Everything one panel session mutates, owned in one place and handed to the loops.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub keymap: KeyMap,
    pub shift: ShiftState,
}

impl Session {
    pub fn new(keymap: KeyMap) -> Self {
        Self { keymap, shift: ShiftState::default() }
    }

    /// Toggles shift if `coord` is the shift key, returning the new state.
    pub fn press_shift(&mut self, coord: &Coordinate) -> Option<bool> {
        (self.keymap.shift_key() == Some(coord)).then(|| self.shift.toggle())
    }
}
