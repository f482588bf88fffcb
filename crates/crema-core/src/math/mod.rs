//! Tick geometry and price conversion

pub mod fee;
pub mod price;
pub mod tick_math;

pub use fee::protocol_fee;
pub use price::{price_impact_pct, sqrt_price_to_ui_price};
pub use tick_math::{
    max_tick_array_index, max_tick_index, min_tick_index, tick_array_index, tick_array_spacing,
    tick_array_start_index,
};
