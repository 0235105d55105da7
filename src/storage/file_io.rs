//! JSON file helpers
//!
//! Tables are whole-file JSON documents replaced atomically; logs (audit,
//! outbox) are JSON lines appended one record at a time.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::FedhaError;

fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> FedhaError {
    FedhaError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

fn ensure_parent(path: &Path) -> Result<(), FedhaError> {
    match path.parent() {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))
        }
        None => Ok(()),
    }
}

/// Read a JSON document; a missing file reads as `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, FedhaError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace a JSON document atomically: write a sibling temp file, sync it,
/// then rename it over the target.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), FedhaError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = path.with_extension("json.tmp");
    let written = File::create(&temp_path)
        .map_err(|e| storage_error("create", &temp_path, e))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, data)
                .map_err(|e| storage_error("serialize", path, e))?;
            writer.flush().map_err(|e| storage_error("flush", &temp_path, e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| storage_error("sync", &temp_path, e))
        })
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| storage_error("replace", path, e)));

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// Append one value as a JSON line
pub fn append_json_line<T, P>(path: P, value: &T) -> Result<(), FedhaError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent(path)?;

    let mut line = serde_json::to_string(value)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FedhaError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    file.write_all(line.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| FedhaError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

/// Read every JSON line of a log, oldest first. Blank lines are skipped; a
/// missing file is an empty log.
pub fn read_json_lines<T, P>(path: P) -> Result<Vec<T>, FedhaError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(FedhaError::Io(format!("Failed to open {}: {}", path.display(), e))),
    };

    let mut values = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| {
            FedhaError::Io(format!("Failed to read {} line {}: {}", path.display(), index + 1, e))
        })?;
        if line.trim().is_empty() {
            continue;
        }
        values.push(serde_json::from_str(&line).map_err(|e| {
            FedhaError::Json(format!("{} line {}: {}", path.display(), index + 1, e))
        })?);
    }
    Ok(values)
}
