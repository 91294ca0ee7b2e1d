use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering::Relaxed},
};

use crate::{Coordinate, Error, KeyEvent, Result, Session, Tick};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    ShiftToggled(bool),
    Name(String),
    Unknown(Coordinate),
    Unassigned(Coordinate),
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::ShiftToggled(held) => write!(f, "[Shift {}]", if *held { "ON" } else { "OFF" }),
            Resolved::Name(name) => write!(f, ">> {name}"),
            Resolved::Unknown(coord) => write!(f, "Unknown key at {coord}"),
            Resolved::Unassigned(coord) => write!(f, "({coord}) has no name assigned yet."),
        }
    }
}

/// Read-only translator from panel events to key names.
pub struct Reader {
    pub session: Session,
}

impl Reader {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn handle(&mut self, event: &KeyEvent) -> Resolved {
        let coord = &event.coord;
        if let Some(held) = self.session.press_shift(coord) {
            return Resolved::ShiftToggled(held);
        }
        let Some(binding) = self.session.keymap.get(coord) else {
            return Resolved::Unknown(coord.clone());
        };
        // keys without a shifted name still report their normal one
        let name = if self.session.shift.is_held() && !binding.shifted.is_empty() {
            &binding.shifted
        } else {
            &binding.normal
        };
        if name.is_empty() {
            Resolved::Unassigned(coord.clone())
        } else {
            Resolved::Name(name.clone())
        }
    }
}

pub fn run<I>(
    reader: &mut Reader,
    events: I,
    stop: &AtomicBool,
    mut report: impl FnMut(&Resolved),
) -> Result<()>
where
    I: IntoIterator<Item = Result<Tick>>,
{
    for tick in events {
        if stop.load(Relaxed) {
            break;
        }
        match tick {
            Ok(Tick::Key(event)) => {
                let resolved = reader.handle(&event);
                match &resolved {
                    Resolved::Unknown(coord) => log::warn!("no binding for {coord}"),
                    r => log::debug!("{} -> {r:?}", event.raw),
                }
                report(&resolved);
            }
            Ok(Tick::Idle) => {}
            Err(e @ Error::MalformedLine { .. }) => log::warn!("{e}"),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
