use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Serialize)]
struct Record<'a, T: Serialize> {
    ts: String,
    event: &'a str,
    data: &'a T,
}

/// Append-only JSON lines log of backtest events.
pub struct AuditLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl AuditLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AuditError::Io {
                path: path.clone(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn log<T: Serialize>(&mut self, event: &str, data: &T) -> Result<(), AuditError> {
        let record = Record {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            event,
            data,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| AuditError::Io {
                path: self.path.clone(),
                source,
            })
    }

    pub fn flush(&mut self) -> Result<(), AuditError> {
        self.writer
            .flush()
            .map_err(|source| AuditError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit log I/O failed ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize audit record: {0}")]
    Serialize(#[from] serde_json::Error),
}
