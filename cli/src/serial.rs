use std::io::{self, BufReader};

use keypanel::{Error, EventSource, Settings};
use serialport::SerialPort;

pub type Port = BufReader<Box<dyn SerialPort>>;

/// Opens the panel's port. The handle closes when the returned source is dropped.
pub fn open(settings: &Settings) -> Result<EventSource<Port>, Error> {
    let port = serialport::new(&settings.port, settings.baud)
        .timeout(settings.timeout)
        .open()
        .map_err(|e| Error::TransportOpen {
            port: settings.port.clone(),
            baud: settings.baud,
            source: io::Error::from(e),
        })?;
    // stale bytes from before we attached are usually half a line
    if let Err(e) = port.clear(serialport::ClearBuffer::Input) {
        log::warn!("couldn't clear input buffer on {}: {e}", settings.port);
    }
    log::info!("opened {} at {} baud", settings.port, settings.baud);
    Ok(EventSource::new(BufReader::new(port)))
}
