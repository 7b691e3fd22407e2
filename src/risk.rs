pub const DEFAULT_TRAIL_ATR_MULT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
}

/// ATR trailing stop. Never trails past the entry price; `None` when the ATR
/// is not positive.
pub fn trail_price(entry: f64, current: f64, atr: f64, k: f64, side: PositionSide) -> Option<f64> {
    if atr <= 0.0 {
        return None;
    }
    match side {
        PositionSide::Long => Some((current - k * atr).max(entry)),
        PositionSide::Short => Some((current + k * atr).min(entry)),
    }
}
