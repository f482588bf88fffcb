//! Typed account records
//!
//! Each record reads its fields in schema order through
//! [`FieldReader`](crate::decoder::FieldReader). Records also derive
//! `BorshSerialize` so test fixtures and simulators can produce the exact
//! bytes the program would store.

mod clmmpool;
mod config;
mod fee_tier;
mod partner;
mod position;
mod rewarder;
mod tick_array;
mod token;

pub use clmmpool::Clmmpool;
pub use config::ClmmConfig;
pub use fee_tier::FeeTier;
pub use partner::Partner;
pub use position::{Position, PositionReward};
pub use rewarder::Rewarder;
pub use tick_array::{Tick, TickArray};
pub use token::{Mint, TokenAccount, TokenAccountState};
