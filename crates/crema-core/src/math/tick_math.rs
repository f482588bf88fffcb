//! # Tick Math
//!
//! Tick array geometry for a given tick spacing.
//!
//! Tick arrays are laid out from the lowest usable tick upward:
//! array `i` covers `[min + i*64*s, min + (i+1)*64*s)` where
//! `min = MIN_TICK_INDEX + |MIN_TICK_INDEX| % s`. Array indices are never
//! negative and are bounded by the array that holds the highest usable tick.

use crate::constants::{MAX_TICK_INDEX, MIN_TICK_INDEX, TICK_ARRAY_SIZE};
use crate::errors::{PriceError, PriceResult};

fn check_spacing(tick_spacing: u16) -> PriceResult<i32> {
    if tick_spacing == 0 {
        return Err(PriceError::InvalidTickSpacing(tick_spacing));
    }
    Ok(tick_spacing as i32)
}

/// Lowest tick usable at this spacing
pub fn min_tick_index(tick_spacing: u16) -> PriceResult<i32> {
    let s = check_spacing(tick_spacing)?;
    Ok(MIN_TICK_INDEX + MIN_TICK_INDEX.abs() % s)
}

/// Highest tick usable at this spacing
pub fn max_tick_index(tick_spacing: u16) -> PriceResult<i32> {
    let s = check_spacing(tick_spacing)?;
    Ok(MAX_TICK_INDEX - MAX_TICK_INDEX % s)
}

/// Number of ticks spanned by one tick array
pub fn tick_array_spacing(tick_spacing: u16) -> PriceResult<i32> {
    Ok(check_spacing(tick_spacing)? * TICK_ARRAY_SIZE as i32)
}

/// Index of the tick array containing `tick`
///
/// Uses floor division, so ticks below the first array yield negative
/// indices; callers filter those out.
pub fn tick_array_index(tick: i32, tick_spacing: u16) -> PriceResult<i32> {
    let spacing = tick_array_spacing(tick_spacing)?;
    let offset = tick as i64 - min_tick_index(tick_spacing)? as i64;
    Ok(offset.div_euclid(spacing as i64) as i32)
}

/// First tick covered by array `array_index`
pub fn tick_array_start_index(array_index: i32, tick_spacing: u16) -> PriceResult<i32> {
    let spacing = tick_array_spacing(tick_spacing)?;
    let start = min_tick_index(tick_spacing)? as i64 + array_index as i64 * spacing as i64;
    i32::try_from(start).map_err(|_| PriceError::Overflow)
}

/// Largest valid array index at this spacing
pub fn max_tick_array_index(tick_spacing: u16) -> PriceResult<i32> {
    tick_array_index(max_tick_index(tick_spacing)?, tick_spacing)
}
