use std::{fs, path::Path};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use keypanel::Settings;

/// Reads settings from `path`, or from the config dir, creating it there with the defaults on
/// first run. Without either the defaults are used as is.
pub fn load(path: Option<&Path>, dirs: Option<&ProjectDirs>) -> Result<Settings> {
    let raw = if let Some(path) = path {
        fs::read_to_string(path).context(format!("couldn't read settings file {path:?}"))?
    } else if let Some(dirs) = dirs {
        let default_settings_content = include_str!("../settings.kdl");
        fs::create_dir_all(dirs.config_dir()).ok();
        let settings_path = dirs.config_dir().join("settings.kdl");
        match fs::read_to_string(&settings_path) {
            Ok(s) => s,
            Err(_) => {
                if let Err(e) = fs::write(&settings_path, default_settings_content) {
                    log::warn!("couldn't write default settings to {settings_path:?}: {e}");
                }
                default_settings_content.to_owned()
            }
        }
    } else {
        log::warn!("no home directory, using default settings");
        return Ok(Settings::default());
    };
    Settings::parse(&raw).context("invalid settings file")
}
