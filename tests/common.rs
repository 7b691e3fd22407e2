#![allow(dead_code)]

use bar_replay::types::Bar;
use chrono::{Duration, NaiveDateTime};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn bar(ts: &str, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(ts, open, high, low, close)
}

/// 400 one-minute bars: 200 rising, then 200 falling.
pub fn trend_bars() -> Vec<Bar> {
    let start = NaiveDateTime::parse_from_str("2023-01-01 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
    (0..400)
        .map(|i| {
            let ts = start + Duration::minutes(i as i64);
            let price = if i < 200 {
                100.0 + i as f64 * 0.2 // uptrend
            } else {
                200.0 - (i as f64 - 200.0) * 0.3 // downtrend
            };
            Bar {
                ts: ts.to_string(),
                open: price,
                high: price + 0.5,
                low: price - 0.5,
                close: price,
                volume: 1500.0,
            }
        })
        .collect()
}

pub fn generate_backtest_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ts,open,high,low,close,volume").unwrap();
    for bar in trend_bars() {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.ts, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
    file
}

pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}
