//! One text file as a miniature table.
//!
//! Each line holds one record with its fields in a fixed positional order,
//! comma separated, no header. Fields go through the `csv` codec, so a value
//! containing a comma, quote or newline is quoted instead of corrupting the
//! line. The whole file is loaded into a map keyed by id when opened;
//! appends write a single line, every other mutation rewrites the file via a
//! temp file and a rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, VaultixError};
use crate::models::{Client, Transaction};

pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Human name used in errors and logs.
    const KIND: &'static str;
    /// Number of positional fields in a well-formed line.
    const FIELDS: usize;

    fn id(&self) -> i64;
}

impl Record for Client {
    const KIND: &'static str = "client";
    const FIELDS: usize = 9;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Transaction {
    const KIND: &'static str = "transaction";
    const FIELDS: usize = 7;

    fn id(&self) -> i64 {
        self.id
    }
}

pub struct FlatFile<R: Record> {
    path: PathBuf,
    records: BTreeMap<i64, R>,
    // The file was hand-edited and its last line has no terminator.
    needs_newline: bool,
}

impl<R: Record> FlatFile<R> {
    /// Opens (creating if needed) the backing file and loads every
    /// well-formed line. Fails with `NotWritable` if the file cannot be
    /// opened for writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let not_writable = |e: std::io::Error| {
            error!("Cannot open {} for writing: {e}", path.display());
            VaultixError::NotWritable(path.display().to_string())
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(not_writable)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(not_writable)?;

        let data = fs::read(&path)?;
        let needs_newline = !data.is_empty() && !data.ends_with(b"\n");
        let records = parse_lines::<R>(&data, &path);
        info!("Loaded {} {} record(s) from {}", records.len(), R::KIND, path.display());

        Ok(Self {
            path,
            records,
            needs_newline,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.contains_key(&id)
    }

    /// One past the largest stored id.
    pub fn next_id(&self) -> Result<i64> {
        match self.records.keys().next_back() {
            None => Ok(1),
            Some(last) => last
                .checked_add(1)
                .ok_or(VaultixError::IdsExhausted(R::KIND)),
        }
    }

    /// Every record, in id order.
    pub fn read_all(&self) -> Vec<R> {
        self.records.values().cloned().collect()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&R> {
        self.records.get(&id)
    }

    /// Writes one line at the end of the file.
    pub fn append(&mut self, record: R) -> Result<()> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(VaultixError::DuplicateId(R::KIND, id));
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if self.needs_newline {
            file.write_all(b"\n")?;
            self.needs_newline = false;
        }
        let mut wtr = line_writer(file);
        wtr.serialize(&record)?;
        wtr.flush()?;

        self.records.insert(id, record);
        debug!("Appended {} {id} to {}", R::KIND, self.path.display());
        Ok(())
    }

    /// Replaces the stored record with the same id. Returns 0 without
    /// touching the file when no such record exists.
    pub fn update(&mut self, record: R) -> Result<usize> {
        let id = record.id();
        if !self.records.contains_key(&id) {
            return Ok(0);
        }
        let mut next = self.records.clone();
        next.insert(id, record);
        self.persist(next)?;
        debug!("Updated {} {id}", R::KIND);
        Ok(1)
    }

    pub fn delete(&mut self, id: i64) -> Result<usize> {
        if !self.records.contains_key(&id) {
            return Ok(0);
        }
        let mut next = self.records.clone();
        next.remove(&id);
        self.persist(next)?;
        debug!("Deleted {} {id}", R::KIND);
        Ok(1)
    }

    /// Keeps the records matching `keep`, rewriting the file once. Returns
    /// how many were removed.
    pub fn retain<F: FnMut(&R) -> bool>(&mut self, mut keep: F) -> Result<usize> {
        let next: BTreeMap<i64, R> = self
            .records
            .iter()
            .filter(|(_, r)| keep(r))
            .map(|(id, r)| (*id, r.clone()))
            .collect();
        let removed = self.records.len() - next.len();
        if removed > 0 {
            self.persist(next)?;
            debug!("Removed {removed} {} record(s)", R::KIND);
        }
        Ok(removed)
    }

    /// Writes `next` over the file and only then adopts it in memory. On
    /// failure the old file, the old records and no temp file remain.
    fn persist(&mut self, next: BTreeMap<i64, R>) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = write_replace(&tmp_path, &self.path, &next) {
            error!("Rewriting {} failed: {e}", self.path.display());
            if tmp_path.exists() {
                fs::remove_file(&tmp_path)?;
            }
            return Err(e);
        }
        self.records = next;
        self.needs_newline = false;
        Ok(())
    }
}

fn write_replace<R: Record>(tmp_path: &Path, path: &Path, records: &BTreeMap<i64, R>) -> Result<()> {
    let file = File::create(tmp_path)?;
    let mut wtr = line_writer(file);
    for record in records.values() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    let file = wtr.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

fn line_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

fn parse_lines<R: Record>(data: &[u8], path: &Path) -> BTreeMap<i64, R> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = BTreeMap::new();
    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unreadable line in {}: {e}", path.display());
                continue;
            }
        };
        let line = row.position().map_or(0, |p| p.line());
        if row.len() < R::FIELDS {
            warn!(
                "Skipping line {line} of {}: expected {} fields, found {}",
                path.display(),
                R::FIELDS,
                row.len()
            );
            continue;
        }
        let record: R = match row.deserialize(None) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping line {line} of {}: {e}", path.display());
                continue;
            }
        };
        let id = record.id();
        if records.contains_key(&id) {
            warn!("Skipping line {line} of {}: duplicate {} id {id}", path.display(), R::KIND);
            continue;
        }
        records.insert(id, record);
    }
    records
}
