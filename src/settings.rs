use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use kdl::{KdlDocument, KdlNode, KdlValue};

pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD: u32 = 115200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_MAP_FILE: &str = "haas_keymap.csv";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub port: String,
    pub baud: u32,
    /// How long a single read waits before the loop gets to check for shutdown.
    pub timeout: Duration,
    pub map_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_owned(),
            baud: DEFAULT_BAUD,
            timeout: DEFAULT_TIMEOUT,
            map_file: DEFAULT_MAP_FILE.into(),
        }
    }
}

impl Settings {
    /// Parses a settings document. Anything left out keeps its default.
    pub fn parse(raw: &str) -> Result<Self> {
        let doc: KdlDocument = raw.parse()?;
        let mut settings = Self::default();
        if let Some(serial) = doc.get("serial").and_then(KdlNode::children) {
            if let Some(port) = get_string("port", serial)? {
                settings.port = port.to_owned();
            }
            if let Some(baud) = get_integer("baud", serial)? {
                settings.baud = u32::try_from(baud).ok().filter(|&b| b > 0).context(
                    format!("'baud' must be a positive 32 bit number, got {baud}"),
                )?;
            }
            if let Some(ms) = get_integer("timeout-ms", serial)? {
                let ms = u64::try_from(ms)
                    .ok()
                    .filter(|&ms| ms > 0)
                    .context(format!("'timeout-ms' must be a positive number, got {ms}"))?;
                settings.timeout = Duration::from_millis(ms);
            }
        }
        if let Some(path) = get_string("map-file", &doc)? {
            settings.map_file = path.into();
        }
        Ok(settings)
    }
}

fn get_string<'a>(name: &str, doc: &'a KdlDocument) -> Result<Option<&'a str>> {
    doc.get_arg(name)
        .map(|v| v.as_string().context(format!("'{name}' should be a string")))
        .transpose()
}

fn get_integer(name: &str, doc: &KdlDocument) -> Result<Option<i128>> {
    doc.get_arg(name)
        .map(|v| KdlValue::as_integer(v).context(format!("'{name}' should be an integer")))
        .transpose()
}
