use std::{
    io::{self, BufRead, Write},
    sync::atomic::{AtomicBool, Ordering::Relaxed},
};

use anyhow::Result;
use keypanel::Prompt;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet};

pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn interrupted() -> bool {
    INTERRUPTED.load(Relaxed)
}

/// Routes ctrl-c into [`INTERRUPTED`] instead of killing the process. No SA_RESTART, so a
/// blocked read wakes up with EINTR.
pub fn register_signal_handler() -> Result<()> {
    extern "C" fn handler(_n: i32) {
        INTERRUPTED.store(true, Relaxed);
    }
    let sig_action = SigAction::new(SigHandler::Handler(handler), SaFlags::empty(), SigSet::empty());
    unsafe {
        signal::sigaction(signal::SIGINT, &sig_action)?;
        signal::sigaction(signal::SIGTERM, &sig_action)?;
    }
    Ok(())
}

/// Asks the operator on stdout and reads the answer from stdin.
pub struct Stdin;

impl Prompt for Stdin {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(question.as_bytes())?;
        stdout.flush()?;
        let answer = read_line(&mut io::stdin().lock())?;
        if answer.is_none() {
            // leave the half written prompt on its own line
            writeln!(stdout)?;
        }
        Ok(answer)
    }
}

/// `BufRead::read_line` retries on EINTR, which would keep a ctrl-c waiting for enter.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    loop {
        let buf = match input.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                if interrupted() {
                    return Ok(None);
                }
                continue;
            }
            Err(e) => return Err(e),
        };
        if buf.is_empty() {
            // eof
            return Ok((!line.is_empty()).then(|| keypanel::event::decode_lossy(&line)));
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(i) => {
                line.extend_from_slice(&buf[..i]);
                input.consume(i + 1);
                let line = keypanel::event::decode_lossy(&line);
                return Ok(Some(line.trim_end_matches('\r').to_owned()));
            }
            None => {
                line.extend_from_slice(buf);
                let n = buf.len();
                input.consume(n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_lines_until_eof() {
        let mut input = Cursor::new("y\r\nF1\nlast");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("y"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("F1"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("last"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }
}
