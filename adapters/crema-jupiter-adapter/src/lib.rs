//! Crema Jupiter Adapter
//!
//! Quote-side integration of Crema CLMM pools: an in-memory [`PoolState`]
//! that tells the caller which accounts to fetch and refreshes atomically
//! from the fetched bytes, a swap simulator, the quote assembler, and the
//! Jupiter `Amm` implementation built on them.

pub mod amm;
pub mod config;
pub mod error;
pub mod pool_state;
pub mod quote;
pub mod simulator;

// Main exports for Jupiter integration
pub use amm::{CremaAmm, CremaPoolParams};
pub use config::{adapter_config, set_adapter_config, AdapterConfig, TickWindow, ADAPTER_CONFIG};
pub use error::{ConfigError, QuoteError, RefreshError, SimulationError};
pub use pool_state::{AccountSource, PoolAccounts, PoolSnapshot, PoolState, TokenDecimals};
pub use quote::{quote, Quote, QuoteAssembler, QuoteRequest, SwapMode};
pub use simulator::{CremaSwapSimulator, SwapEstimate, SwapRequest, SwapSimulator};

// Re-export the core crate for account and math types
pub use crema_core;
