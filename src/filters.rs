use crate::types::Bar;
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Timelike};
use std::str::FromStr;
use thiserror::Error;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A time-of-day range, inclusive at both ends. `start > end` means the
/// session crosses midnight.
///
/// Timestamps without an offset are taken as exchange-local. With
/// `utc_offset` set, timestamps carrying an offset are converted to it
/// first; otherwise their wall clock is used as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub utc_offset: Option<FixedOffset>,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            utc_offset: None,
        }
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    /// Parses `HH:MM` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, SessionError> {
        Ok(Self::new(parse_hhmm(start)?, parse_hhmm(end)?))
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }

    pub fn filter(&self, bars: impl IntoIterator<Item = Bar>) -> Result<Vec<Bar>, SessionError> {
        let mut kept = Vec::new();
        for bar in bars {
            if self.contains(self.local_time(&bar.ts)?) {
                kept.push(bar);
            }
        }
        Ok(kept)
    }

    /// Exchange-local time of day of a bar timestamp.
    pub fn local_time(&self, ts: &str) -> Result<NaiveTime, SessionError> {
        let ts = ts.trim();
        if let (Some(offset), Ok(dt)) = (self.utc_offset, DateTime::parse_from_rfc3339(ts)) {
            return Ok(dt.with_timezone(&offset).time());
        }
        Ok(parse_bar_timestamp(ts)?.time())
    }
}

/// Accepts `start-end`, e.g. `09:15-15:30`.
impl FromStr for SessionWindow {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| SessionError::InvalidWindow(s.to_string()))?;
        Self::parse(start, end)
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime, SessionError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| SessionError::InvalidTime(s.to_string()))
}

/// Parses `+HH:MM` / `-HH:MM`, e.g. `+05:30` for Indian exchanges.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, SessionError> {
    let invalid = || SessionError::InvalidOffset(s.to_string());
    let raw = s.trim();
    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let time = NaiveTime::parse_from_str(rest, "%H:%M").map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * time.num_seconds_from_midnight() as i32).ok_or_else(invalid)
}

/// Wall-clock time of a bar timestamp. Offsets in RFC 3339 input are kept as
/// local time, not converted.
pub fn parse_bar_timestamp(ts: &str) -> Result<NaiveDateTime, SessionError> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .ok_or_else(|| SessionError::InvalidTimestamp(ts.to_string()))
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid session window `{0}`, expected HH:MM-HH:MM")]
    InvalidWindow(String),
    #[error("Invalid UTC offset `{0}`, expected +HH:MM or -HH:MM")]
    InvalidOffset(String),
    #[error("Could not parse bar timestamp `{0}`")]
    InvalidTimestamp(String),
}
