use super::DataFeed;
use crate::{
    filters::{SessionError, SessionWindow},
    types::Bar,
};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::{collections::VecDeque, fs::File};
use thiserror::Error;
use tracing::debug;

/// Bars read up front from a headered OHLCV file.
///
/// Columns: `ts`, `datetime` and `date` (the first non-empty one becomes the
/// bar timestamp), `open`, `high`, `low`, `close` and an optional `volume`
/// that defaults to 0.
pub struct CsvDataFeed {
    name: String,
    data: VecDeque<Bar>,
}

impl CsvDataFeed {
    /// A `limit` of 0 reads the whole file.
    pub fn new(name: String, path: String, limit: Option<usize>) -> Result<Self, CsvDataFeedError> {
        let limit = limit.filter(|&limit| limit > 0);
        let file = File::open(&path)
            .map_err(|err| CsvDataFeedError::FileOpenError(path.clone(), err.to_string()))?;
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);
        let mut data = VecDeque::new();
        for (row, result) in rdr.deserialize::<CsvRow>().enumerate() {
            if limit.is_some_and(|limit| data.len() >= limit) {
                break;
            }
            let record = result
                .map_err(|err| CsvDataFeedError::MalformedRow(row + 1, err.to_string()))?;
            data.push_back(Bar::from(record));
        }
        debug!("Loaded {} bars from {path}", data.len());
        Ok(Self { name, data })
    }

    pub fn from_bars(name: String, bars: impl IntoIterator<Item = Bar>) -> Self {
        Self {
            name,
            data: bars.into_iter().collect(),
        }
    }

    /// Drops every remaining bar outside `window`.
    pub fn retain_session(&mut self, window: &SessionWindow) -> Result<(), SessionError> {
        let bars = std::mem::take(&mut self.data);
        self.data = window.filter(bars)?.into();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.data.into()
    }
}

#[derive(Deserialize)]
struct CsvRow {
    ts: Option<String>,
    datetime: Option<String>,
    date: Option<String>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        let ts = [row.ts, row.datetime, row.date]
            .into_iter()
            .flatten()
            .find(|ts| !ts.is_empty())
            .unwrap_or_default();
        Self {
            ts,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl DataFeed for CsvDataFeed {
    fn name(&self) -> &str {
        &self.name
    }
    fn next_bar(&mut self) -> Option<Bar> {
        self.data.pop_front()
    }
}

#[derive(Debug, Error)]
pub enum CsvDataFeedError {
    #[error("Failed to open CSV file ({0}): {1}")]
    FileOpenError(String, String),
    #[error("Malformed CSV row {0}: {1}")]
    MalformedRow(usize, String),
}
