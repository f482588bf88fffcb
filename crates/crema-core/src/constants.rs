//! # Protocol Constants
//!
//! Fixed values of the Crema concentrated-liquidity program:
//! - Program identity
//! - Tick and sqrt-price bounds
//! - Tick array geometry
//! - Fee denominators
//! - Quote price-limit sentinels

use solana_program::{pubkey, pubkey::Pubkey};

// ============================================================================
// Program Identity
// ============================================================================

/// Crema CLMM program on mainnet
pub const CREMA_PROGRAM_ID: Pubkey = pubkey!("CLMM9tUoggJu2wagPkkqs9eFG4BWhVBZWkP1qv3Sp7tR");

/// Human-readable label used by routers
pub const CREMA_LABEL: &str = "Crema";

// ============================================================================
// Tick & Price Bounds
// ============================================================================

/// Q64 fixed-point scale factor: 2^64
pub const Q64: u128 = 1u128 << 64;

/// Minimum tick index supported by the program
pub const MIN_TICK_INDEX: i32 = -443_636;

/// Maximum tick index supported by the program
pub const MAX_TICK_INDEX: i32 = 443_636;

/// Minimum sqrt price (Q64.64)
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

/// Maximum sqrt price (Q64.64)
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

// ============================================================================
// Tick Arrays
// ============================================================================

/// Number of ticks held by one tick array account
pub const TICK_ARRAY_SIZE: usize = 64;

/// Number of tick arrays fetched on each side of the current one
pub const TICK_ARRAY_WINDOW_RADIUS: i32 = 2;

/// Number of reward emitters a pool can carry
pub const REWARDER_NUM: usize = 3;

// ============================================================================
// Fees
// ============================================================================

/// Denominator of the per-swap fee rate (`fee_rate = 3000` is 0.3%)
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

/// Denominator of the protocol's share of swap fees
pub const PROTOCOL_FEE_RATE_DENOMINATOR: u64 = 10_000;

// ============================================================================
// Quote Sentinels
// ============================================================================

/// Price limit passed for exact-in quotes
///
/// Protocol-fixed marker rather than a real floor; a limit behind the
/// current price in swap direction does not bind.
pub const SQRT_PRICE_LIMIT_LOWER_X64: u128 = 184_467_440_737_095_516;

/// Price limit passed for exact-out quotes
pub const SQRT_PRICE_LIMIT_UPPER_X64: u128 = 15_793_534_762_490_258_745;

// ============================================================================
// Encoding
// ============================================================================

/// Width of the Anchor account discriminator
pub const DISCRIMINATOR_LEN: usize = 8;

/// Width of an encoded address
pub const PUBKEY_LEN: usize = 32;

/// Seeds for program-derived addresses
pub mod seeds {
    pub const CLMM_CONFIG: &[u8] = b"clmmconfig";
    pub const FEE_TIER: &[u8] = b"fee_tier";
    pub const TICK_ARRAY: &[u8] = b"tick_array";
    pub const TICK_ARRAY_MAP: &[u8] = b"tick_array_map";
    pub const PARTNER: &[u8] = b"partner";
    pub const POSITION: &[u8] = b"position";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_price_bounds_ordering() {
        assert!(MIN_SQRT_PRICE_X64 < SQRT_PRICE_LIMIT_LOWER_X64);
        assert!(SQRT_PRICE_LIMIT_LOWER_X64 < SQRT_PRICE_LIMIT_UPPER_X64);
        assert!(SQRT_PRICE_LIMIT_UPPER_X64 < Q64);
        assert!(Q64 < MAX_SQRT_PRICE_X64);
    }

    #[test]
    fn test_tick_bounds_symmetric() {
        assert_eq!(MIN_TICK_INDEX, -MAX_TICK_INDEX);
    }
}
