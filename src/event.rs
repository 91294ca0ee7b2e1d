use std::io::{self, BufRead};

use crate::{Coordinate, Error, Result};

pub const PREFIX: &str = "Key: Row";

// `Key: Row <R> Col <C>`
const ROW_FIELD: usize = 2;
const COL_FIELD: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub coord: Coordinate,
    pub raw: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    Key(KeyEvent),
    /// Nothing usable arrived before the read timed out, or the line was noise.
    Idle,
}

/// Parses one already-decoded line. Lines without the event prefix are not events and give
/// `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<KeyEvent>> {
    let line = line.trim();
    if !line.starts_with(PREFIX) {
        return Ok(None);
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    match (parts.get(ROW_FIELD), parts.get(COL_FIELD)) {
        (Some(row), Some(col)) => Ok(Some(KeyEvent {
            coord: Coordinate::new(*row, *col),
            raw: line.to_owned(),
        })),
        _ => Err(Error::MalformedLine { line: line.to_owned(), found: parts.len() }),
    }
}

/// Bytes that aren't valid utf-8 are dropped rather than replaced.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect()
}

/// Endless stream of key events read off a line oriented transport.
///
/// Each call to `next` performs at most one blocking read. A read that times out yields
/// [`Tick::Idle`] so the caller gets a chance to check for shutdown, and any half received line
/// is held on to until the rest of it shows up. The iterator only ends when the transport
/// reports end of stream.
pub struct EventSource<R> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: BufRead> EventSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pending: Vec::new() }
    }

    fn take_line(&mut self) -> Result<Tick> {
        let line = decode_lossy(&self.pending);
        self.pending.clear();
        log::debug!(target: "serial", "{}", line.trim_end());
        Ok(parse_line(&line)?.map_or(Tick::Idle, Tick::Key))
    }
}

impl<R: BufRead> Iterator for EventSource<R> {
    type Item = Result<Tick>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => None,
            // end of stream with an unterminated line still counts as a line
            Ok(_) => Some(self.take_line()),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Some(Ok(Tick::Idle))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
