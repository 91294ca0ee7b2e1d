use std::{
    fmt, io,
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering::Relaxed},
};

use crate::{Coordinate, Error, Field, KeyEvent, Result, Session, Tick};

/// Blocking question/answer channel to whoever is mapping the panel.
pub trait Prompt {
    /// `Ok(None)` means the operator went away (input closed or interrupted).
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    ShiftToggled(bool),
    /// Overwrite was declined.
    Kept,
    Assigned { coord: Coordinate, field: Field, name: String, shift_key: bool },
    Stopped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::ShiftToggled(held) => write!(f, "[Shift {}]", if *held { "ON" } else { "OFF" }),
            Outcome::Kept => write!(f, "Kept existing name."),
            Outcome::Assigned { coord, shift_key: true, .. } => {
                write!(f, "Shift key mapped at {coord}")
            }
            Outcome::Assigned { coord, name, .. } if name.is_empty() => {
                write!(f, "{coord} cleared")
            }
            Outcome::Assigned { coord, field: Field::Shifted, name, .. } => {
                write!(f, "{coord} (shifted) = {name}")
            }
            Outcome::Assigned { coord, name, .. } => write!(f, "{coord} = {name}"),
            Outcome::Stopped => write!(f, "Input closed."),
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Interactive editor for a keymap file. Every change is written straight back to `path`.
pub struct Mapper {
    pub session: Session,
    path: PathBuf,
}

impl Mapper {
    pub fn new(session: Session, path: impl Into<PathBuf>) -> Self {
        Self { session, path: path.into() }
    }

    pub fn save(&self) -> Result<()> {
        self.session.keymap.save(&self.path)
    }

    pub fn handle(&mut self, event: &KeyEvent, prompt: &mut impl Prompt) -> Result<Outcome> {
        let coord = &event.coord;
        if let Some(held) = self.session.press_shift(coord) {
            log::info!("shift {}", if held { "on" } else { "off" });
            return Ok(Outcome::ShiftToggled(held));
        }

        let held = self.session.shift.is_held();
        let field = Field::for_shift(held);
        let prev = self.session.keymap.lookup(coord).get(field);
        if !prev.is_empty() {
            let question = format!("{coord} already mapped to '{prev}'. Overwrite? (y/n): ");
            match prompt.ask(&question)? {
                None => return Ok(Outcome::Stopped),
                Some(answer) if !is_affirmative(&answer) => return Ok(Outcome::Kept),
                Some(_) => {}
            }
        }

        let question =
            if held { format!("Shift active → {coord} = ") } else { format!("{coord} = ") };
        let Some(name) = prompt.ask(&question)? else {
            return Ok(Outcome::Stopped);
        };
        let shift_key = self.session.keymap.assign(coord, field, name);
        let name = self.session.keymap.lookup(coord).get(field).to_owned();
        log::info!("{coord} {field:?} = {name:?}");
        if shift_key {
            log::info!("shift key is now {coord}");
        }
        self.save()?;
        Ok(Outcome::Assigned { coord: coord.clone(), field, name, shift_key })
    }
}

/// Feeds events to `mapper` until `stop` is raised, the transport ends or the operator stops
/// answering, then saves one last time.
pub fn run<I>(
    mapper: &mut Mapper,
    events: I,
    prompt: &mut impl Prompt,
    stop: &AtomicBool,
    mut report: impl FnMut(&Outcome),
) -> Result<()>
where
    I: IntoIterator<Item = Result<Tick>>,
{
    let result = drive(mapper, events.into_iter(), prompt, stop, &mut report);
    mapper.save()?;
    result
}

fn drive(
    mapper: &mut Mapper,
    events: impl Iterator<Item = Result<Tick>>,
    prompt: &mut impl Prompt,
    stop: &AtomicBool,
    report: &mut impl FnMut(&Outcome),
) -> Result<()> {
    for tick in events {
        if stop.load(Relaxed) {
            break;
        }
        let event = match tick {
            Ok(Tick::Key(event)) => event,
            Ok(Tick::Idle) => continue,
            Err(e @ Error::MalformedLine { .. }) => {
                log::warn!("{e}");
                continue;
            }
            Err(e) => return Err(e),
        };
        let outcome = mapper.handle(&event, prompt)?;
        report(&outcome);
        if outcome == Outcome::Stopped || stop.load(Relaxed) {
            break;
        }
    }
    Ok(())
}
