mod input;
mod serial;
mod settings;

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{
    Parser, Subcommand,
    builder::{Styles, styling::AnsiColor::*},
};
use directories::ProjectDirs;
use keypanel::{KeyMap, Mapper, Reader, Session, Settings, mapper, reader};
use log::{LevelFilter, error, info};

/// Map and read the key matrix of a serial control panel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, styles = STYLES)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Path to settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial device the panel is attached to
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Serial speed
    #[arg(short, long, global = true)]
    baud: Option<u32>,

    /// Where the keymap is stored
    #[arg(short, long, global = true)]
    map_file: Option<PathBuf>,

    /// Where to output logs
    #[arg(short = 'o', long, global = true)]
    log_file: Option<PathBuf>,

    /// Include more log output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Name keys interactively as they are pressed
    Map,
    /// Print the name of every key pressed
    Read,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let dirs = ProjectDirs::from("", "", "keypanel");
    let log_file = args.log_file.clone().or_else(|| {
        let d = dirs.as_ref()?.data_dir();
        fs::create_dir_all(d).ok()?;
        Some(d.join("log.txt"))
    });
    if let Some(log_file) = &log_file {
        let level =
            LevelFilter::iter().nth(1 + args.verbose as usize).unwrap_or(LevelFilter::max());
        ftail::Ftail::new().single_file(log_file, true, level).init().ok();
        log_panics::init();
    }

    match run(&args, dirs.as_ref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, dirs: Option<&ProjectDirs>) -> Result<()> {
    let settings = configure(args, dirs)?;
    input::register_signal_handler().context("couldn't install ctrl-c handler")?;
    match args.mode {
        Mode::Map => map(&settings),
        Mode::Read => read(&settings),
    }
}

fn configure(args: &Args, dirs: Option<&ProjectDirs>) -> Result<Settings> {
    let mut settings = settings::load(args.config.as_deref(), dirs)?;
    if let Some(port) = &args.port {
        settings.port = port.clone();
    }
    if let Some(baud) = args.baud {
        settings.baud = baud;
    }
    if let Some(map_file) = &args.map_file {
        settings.map_file = map_file.clone();
    }
    info!("{settings:?}");
    Ok(settings)
}

fn map(settings: &Settings) -> Result<()> {
    let path = &settings.map_file;
    println!("Mapping file: {}", path.display());
    let keymap = KeyMap::load_or_empty(path)?;
    if keymap.is_empty() {
        println!("No existing keymap found. A new one will be created.");
    } else {
        println!("Loaded existing map with {} keys.", keymap.len());
    }
    let events = serial::open(settings)?;
    let mut mapper = Mapper::new(Session::new(keymap), path);
    println!("Listening for key presses... (Ctrl+C to quit)");
    mapper::run(&mut mapper, events, &mut input::Stdin, &input::INTERRUPTED, |outcome| {
        println!("{outcome}");
        if matches!(outcome, mapper::Outcome::Assigned { .. }) {
            println!("✅ Map saved to: {}\n", path.display());
        }
    })?;
    if input::interrupted() {
        println!("\nExiting cleanly.");
    }
    println!("✅ Map saved to: {}", path.display());
    Ok(())
}

fn read(settings: &Settings) -> Result<()> {
    let path = &settings.map_file;
    let keymap = KeyMap::load(path)?;
    println!("✅ Loaded {} keys from {}", keymap.len(), path.display());
    match keymap.shift_key() {
        Some(coord) => println!("Shift key detected at {coord}"),
        None => println!("⚠️ No shift key defined in keymap."),
    }
    let events = serial::open(settings)?;
    let mut reader = Reader::new(Session::new(keymap));
    println!("\nListening for key presses... (Ctrl+C to quit)\n");
    reader::run(&mut reader, events, &input::INTERRUPTED, |resolved| println!("{resolved}"))?;
    if input::interrupted() {
        println!("\nExiting cleanly.");
    }
    Ok(())
}

const STYLES: Styles =
    Styles::styled().literal(Cyan.on_default().bold()).placeholder(Blue.on_default());
