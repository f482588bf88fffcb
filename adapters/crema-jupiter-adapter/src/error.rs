//! Errors raised while synchronizing pool state and assembling quotes

use crema_core::{AccountKind, DecodeError, PriceError};
use solana_program::pubkey::Pubkey;
use thiserror::Error;

/// Failure to rebuild pool state from fetched account bytes
///
/// A failed refresh leaves the previous state in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Required account {0} missing from fetched accounts")]
    MissingRequiredAccount(Pubkey),

    #[error("Tick array {address} failed to decode: {source}")]
    TickArrayDecodeFailed {
        address: Pubkey,
        #[source]
        source: DecodeError,
    },

    #[error("{kind} account failed to decode: {source}")]
    PoolDecodeFailed {
        kind: AccountKind,
        #[source]
        source: DecodeError,
    },
}

/// Failure of the swap-simulation primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Swap math error: {0}")]
    Math(&'static str),

    #[error("Liquidity out of range after crossing tick {tick}")]
    LiquidityOverflow { tick: i32 },

    #[error("Amount limit {limit} violated by estimate {estimate}")]
    AmountLimitExceeded { limit: u64, estimate: u64 },

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Tick geometry: {0}")]
    Geometry(#[from] PriceError),
}

/// Failure to produce a quote
///
/// Quoting is read-only; none of these alter pool state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Mint {0} is not traded by this pool")]
    UnsupportedMint(Pubkey),

    #[error("Pool price at sqrt price {sqrt_price} converts to zero")]
    DegeneratePrice { sqrt_price: u128 },

    #[error("Tick array {array_index:?} holding the current tick is not loaded")]
    InsufficientTickData { array_index: Option<u16> },

    #[error("Pool has not been refreshed yet")]
    NotRefreshed,

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Invalid adapter configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse adapter config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid program id `{0}`")]
    InvalidProgramId(String),

    #[error("Invalid adapter config: {0}")]
    Invalid(String),
}

pub type RefreshResult<T> = Result<T, RefreshError>;
pub type QuoteResult<T> = Result<T, QuoteError>;
pub type SimulationResult<T> = Result<T, SimulationError>;
