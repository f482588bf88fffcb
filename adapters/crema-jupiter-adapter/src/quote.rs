//! # Quote Assembly
//!
//! Turns a swap request against a [`PoolState`] into a [`Quote`]:
//!
//! 1. **Direction**: the source mint must be one of the pool's mints and the
//!    destination the other one; `a_to_b` when the source is token A.
//! 2. **Bounds**: exact-in swaps run against the lower sqrt-price sentinel,
//!    exact-out swaps against the upper one. No amount limit is applied.
//! 3. **Simulation**: the injected [`SwapSimulator`] walks the tick arrays
//!    selected by [`TickWindow`].
//! 4. **Assembly**: `fee_amount = amount * fee_rate` over the requested
//!    amount, and price impact between the pool price and the simulated end
//!    price, both in human-scale units.
//!
//! Running out of liquidity is not an error; it is reported through
//! [`Quote::not_enough_liquidity`].

use crema_core::{
    math::{price_impact_pct, sqrt_price_to_ui_price, tick_array_index},
    PriceError, TickArray, SQRT_PRICE_LIMIT_LOWER_X64, SQRT_PRICE_LIMIT_UPPER_X64,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::config::{adapter_config, AdapterConfig, TickWindow};
use crate::error::{QuoteError, QuoteResult};
use crate::pool_state::{PoolSnapshot, PoolState};
use crate::simulator::{CremaSwapSimulator, SwapRequest, SwapSimulator};

// =============================================================================
// REQUEST & QUOTE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapMode {
    /// `amount` is the input to spend
    #[default]
    ExactIn,
    /// `amount` is the output to receive
    ExactOut,
}

impl From<jupiter_amm_interface::SwapMode> for SwapMode {
    fn from(mode: jupiter_amm_interface::SwapMode) -> Self {
        match mode {
            jupiter_amm_interface::SwapMode::ExactIn => SwapMode::ExactIn,
            jupiter_amm_interface::SwapMode::ExactOut => SwapMode::ExactOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRequest {
    pub source_mint: Pubkey,
    pub destination_mint: Pubkey,
    pub amount: u64,
    pub swap_mode: SwapMode,
}

/// Estimated outcome of one swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// The pool's liquidity ran out before the amount was filled
    pub not_enough_liquidity: bool,
    /// Input including fees
    pub in_amount: u64,
    pub out_amount: u64,
    pub fee_mint: Pubkey,
    /// `amount * fee_rate`, in millionths of a token unit
    pub fee_amount: u128,
    /// Pool fee rate, denominator 1e6
    pub fee_rate: u16,
    /// Percent, e.g. `0.25` for a quarter of a percent
    pub price_impact_pct: Decimal,
    pub a_to_b: bool,
    pub by_amount_in: bool,
    pub end_sqrt_price: u128,
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Quote assembler over an injectable swap simulator
#[derive(Debug, Clone, Default)]
pub struct QuoteAssembler<S = CremaSwapSimulator> {
    simulator: S,
    window: TickWindow,
}

impl QuoteAssembler<CremaSwapSimulator> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default simulator with the window from `config`
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self {
            simulator: CremaSwapSimulator,
            window: config.simulation_window,
        }
    }
}

impl<S: SwapSimulator> QuoteAssembler<S> {
    pub fn with_simulator(simulator: S) -> Self {
        Self {
            simulator,
            window: TickWindow::default(),
        }
    }

    pub fn with_window(mut self, window: TickWindow) -> Self {
        self.window = window;
        self
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn window(&self) -> TickWindow {
        self.window
    }

    pub fn quote(&self, state: &PoolState, request: &QuoteRequest) -> QuoteResult<Quote> {
        let snapshot = state.snapshot();
        let pool = &snapshot.pool;

        let a_to_b = swap_direction(&pool.token_a, &pool.token_b, request)?;

        let decimals = state.decimals();
        let price_before =
            sqrt_price_to_ui_price(pool.current_sqrt_price, decimals.decimals_a, decimals.decimals_b)?;
        if price_before.is_zero() {
            warn!(
                pool = %state.address(),
                sqrt_price = pool.current_sqrt_price,
                "Pool price is degenerate"
            );
            return Err(QuoteError::DegeneratePrice {
                sqrt_price: pool.current_sqrt_price,
            });
        }

        let tick_arrays = self.select_tick_arrays(&snapshot, a_to_b)?;

        let (sqrt_price_limit, by_amount_in, fee_mint) = match request.swap_mode {
            SwapMode::ExactIn => (SQRT_PRICE_LIMIT_LOWER_X64, true, request.destination_mint),
            SwapMode::ExactOut => (SQRT_PRICE_LIMIT_UPPER_X64, false, request.source_mint),
        };

        let estimate = self.simulator.simulate(&SwapRequest {
            pool,
            tick_arrays: &tick_arrays,
            amount: request.amount,
            sqrt_price_limit,
            amount_limit: 0,
            a_to_b,
            by_amount_in,
            protocol_fee_rate: state.config().protocol_fee_rate,
        })?;

        let fee_amount = request.amount as u128 * pool.fee_rate as u128;

        let price_after =
            sqrt_price_to_ui_price(estimate.end_sqrt_price, decimals.decimals_a, decimals.decimals_b)?;
        let price_impact_pct =
            price_impact_pct(price_before, price_after).ok_or(PriceError::Overflow)?;

        debug!(
            pool = %state.address(),
            a_to_b,
            by_amount_in,
            amount = request.amount,
            in_amount = estimate.amount_in,
            out_amount = estimate.amount_out,
            is_exceed = estimate.is_exceed,
            %price_impact_pct,
            "Quote assembled"
        );

        Ok(Quote {
            not_enough_liquidity: estimate.is_exceed,
            in_amount: estimate.amount_in,
            out_amount: estimate.amount_out,
            fee_mint,
            fee_amount,
            fee_rate: pool.fee_rate,
            price_impact_pct,
            a_to_b,
            by_amount_in,
            end_sqrt_price: estimate.end_sqrt_price,
        })
    }

    /// Arrays handed to the simulator; the current one must be loaded
    ///
    /// `Fetched` extends the current array with its loaded neighbours in swap
    /// direction and stops at the first one missing, so a gap is never read
    /// as an empty range.
    fn select_tick_arrays<'a>(
        &self,
        snapshot: &'a PoolSnapshot,
        a_to_b: bool,
    ) -> QuoteResult<Vec<&'a TickArray>> {
        let pool = &snapshot.pool;
        let current_index = tick_array_index(pool.current_tick_index, pool.tick_spacing)?;
        let current_index = u16::try_from(current_index)
            .map_err(|_| QuoteError::InsufficientTickData { array_index: None })?;
        let current = snapshot
            .tick_array(current_index)
            .ok_or(QuoteError::InsufficientTickData {
                array_index: Some(current_index),
            })?;

        let mut selected = vec![current];
        if self.window == TickWindow::Fetched {
            let step = |index: u16| {
                if a_to_b {
                    index.checked_sub(1)
                } else {
                    index.checked_add(1)
                }
            };
            let mut next = step(current_index);
            while let Some(array) = next.and_then(|index| snapshot.tick_array(index)) {
                selected.push(array);
                next = step(array.array_index);
            }
        }
        Ok(selected)
    }
}

/// `true` for token A to token B; any other pairing is unsupported
fn swap_direction(token_a: &Pubkey, token_b: &Pubkey, request: &QuoteRequest) -> QuoteResult<bool> {
    let a_to_b = if request.source_mint == *token_a {
        true
    } else if request.source_mint == *token_b {
        false
    } else {
        return Err(QuoteError::UnsupportedMint(request.source_mint));
    };
    let expected_destination = if a_to_b { token_b } else { token_a };
    if request.destination_mint != *expected_destination {
        return Err(QuoteError::UnsupportedMint(request.destination_mint));
    }
    Ok(a_to_b)
}

/// Quote with the default simulator and the global adapter configuration
pub fn quote(state: &PoolState, request: &QuoteRequest) -> QuoteResult<Quote> {
    QuoteAssembler::<CremaSwapSimulator>::from_config(&adapter_config()).quote(state, request)
}
