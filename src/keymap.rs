use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use serde::Serialize;

use crate::{Coordinate, Error, Field, KeyBinding, Result, is_shift_name};

const HEADER: [&str; 4] = ["Row", "Col", "Normal", "Shifted"];

/// One line of the keymap file. Field names double as the header row.
#[derive(Debug, Serialize)]
struct Record<'a> {
    #[serde(rename = "Row")]
    row: &'a str,
    #[serde(rename = "Col")]
    col: &'a str,
    #[serde(rename = "Normal")]
    normal: &'a str,
    #[serde(rename = "Shifted")]
    shifted: &'a str,
}

static UNASSIGNED: KeyBinding = KeyBinding { normal: String::new(), shifted: String::new() };

/// Coordinate to binding table that remembers the order keys were first seen in, so saving the
/// same map twice produces the same file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyMap {
    entries: Vec<(Coordinate, KeyBinding)>,
    index: HashMap<Coordinate, usize>,
    shift: Option<Coordinate>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a keymap that has to exist.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::read_from(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::MapNotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`KeyMap::load`] but a missing file is just an empty map.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::MapNotFound(_)) => Ok(Self::new()),
            r => r,
        }
    }

    /// Columns are found by header name. `Normal` and `Shifted` may be missing entirely, and rows
    /// that stop early read the missing names as empty.
    pub fn read_from(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let [row, col, normal, shifted] = HEADER.map(column);
        let row = row.ok_or(Error::MissingColumn(HEADER[0]))?;
        let col = col.ok_or(Error::MissingColumn(HEADER[1]))?;

        let mut map = Self::new();
        for record in csv.records() {
            let record = record?;
            let field = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("");
            let coord = Coordinate::new(field(Some(row)), field(Some(col)));
            if coord.row.is_empty() || coord.col.is_empty() {
                log::warn!("skipping keymap row {:?} without a coordinate", record);
                continue;
            }
            let binding = KeyBinding::new(field(normal), field(shifted));
            // later rows win, both for duplicates and for the shift key
            if binding.is_shift() {
                map.shift = Some(coord.clone());
            }
            map.insert(coord, binding);
        }
        Ok(map)
    }

    /// Overwrites `path` with the whole map. The file is truncated and rewritten in place, so a
    /// crash halfway through can leave it partially written.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.write_to(File::create(path)?)?;
        log::info!("saved {} keys to {}", self.len(), path.display());
        Ok(())
    }

    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        if self.is_empty() {
            // serialize only emits the header alongside the first record
            csv.write_record(HEADER)?;
        }
        for (coord, binding) in &self.entries {
            csv.serialize(Record {
                row: &coord.row,
                col: &coord.col,
                normal: &binding.normal,
                shifted: &binding.shifted,
            })?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn get(&self, coord: &Coordinate) -> Option<&KeyBinding> {
        self.index.get(coord).map(|&i| &self.entries[i].1)
    }

    /// Same as [`KeyMap::get`] but an unknown coordinate reads as a binding with no names.
    pub fn lookup(&self, coord: &Coordinate) -> &KeyBinding {
        self.get(coord).unwrap_or(&UNASSIGNED)
    }

    /// Sets one layer of a key, creating the key if needed. Names are stored trimmed, the same
    /// way they load. Naming the normal layer "shift" moves the shift key here; the old shift key
    /// keeps its binding. Returns whether that happened.
    pub fn assign(&mut self, coord: &Coordinate, field: Field, name: impl Into<String>) -> bool {
        let name = name.into().trim().to_owned();
        let designates = field == Field::Normal && is_shift_name(&name);
        match self.index.get(coord) {
            Some(&i) => self.entries[i].1.set(field, name),
            None => {
                let mut binding = KeyBinding::default();
                binding.set(field, name);
                self.insert(coord.clone(), binding);
            }
        }
        if designates {
            // last "shift" row wins on load, so the new shift key has to be saved last
            self.move_to_end(coord);
            self.shift = Some(coord.clone());
        }
        designates
    }

    fn move_to_end(&mut self, coord: &Coordinate) {
        let Some(&i) = self.index.get(coord) else { return };
        let entry = self.entries.remove(i);
        self.entries.push(entry);
        for (j, (c, _)) in self.entries.iter().enumerate().skip(i) {
            self.index.insert(c.clone(), j);
        }
    }

    fn insert(&mut self, coord: Coordinate, binding: KeyBinding) {
        if let Some(&i) = self.index.get(&coord) {
            self.entries[i].1 = binding;
        } else {
            self.index.insert(coord.clone(), self.entries.len());
            self.entries.push((coord, binding));
        }
    }

    pub fn shift_key(&self) -> Option<&Coordinate> {
        self.shift.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &KeyBinding)> {
        self.entries.iter().map(|(c, b)| (c, b))
    }
}
