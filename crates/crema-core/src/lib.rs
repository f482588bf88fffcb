//! # Crema Core - Account Decoding and Pool Geometry
//!
//! Shared building blocks for off-chain clients of the Crema
//! concentrated-liquidity program:
//!
//! - Schema catalog of every account kind a pool touches
//! - Schema-driven binary decoder producing typed records
//! - Tick array geometry and sqrt-price conversion
//! - Program-derived addresses and the tick-array window of a pool
//!
//! Nothing here performs I/O; callers fetch account bytes themselves.

pub mod address;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod math;
pub mod schema;
pub mod state;

// Re-export commonly used items
pub use address::{relevant_addresses, PdaBuilder, TickArrayWindow};
pub use constants::*;
pub use decoder::{decode, decode_as, AccountRecord, DecodedAccount};
pub use errors::{DecodeError, DecodeResult, PriceError, PriceResult};
pub use schema::AccountKind;
pub use state::*;
