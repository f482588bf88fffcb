//! # Swap Simulation
//!
//! Estimates a swap against a pool and a set of loaded tick arrays.
//!
//! [`CremaSwapSimulator`] walks the initialized ticks of the supplied arrays
//! in swap direction and then on to the edge of the supplied window, one
//! step per price range. Each step follows the program's swap step:
//!
//! - Exact in: the fee is taken from the remaining amount up front; a step
//!   that reaches its target price pays `ceil(in * fee / (1e6 - fee))`.
//! - Exact out: the step fills as much output as the range allows and pays
//!   the fee on the input it needs.
//!
//! Crossing a tick applies its net liquidity, negated when the price falls.

use crema_core::{
    math::{protocol_fee, tick_math::tick_array_spacing},
    Clmmpool, Tick, TickArray, FEE_RATE_DENOMINATOR, MAX_TICK_INDEX, MIN_TICK_INDEX,
};
use orca_whirlpools_core::{
    tick_index_to_sqrt_price, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b, U128,
};

use crate::error::{SimulationError, SimulationResult};

/// Inputs of one swap estimate
#[derive(Debug, Clone, Copy)]
pub struct SwapRequest<'a> {
    pub pool: &'a Clmmpool,
    /// Arrays the simulation may walk, any order
    pub tick_arrays: &'a [&'a TickArray],
    pub amount: u64,
    /// Q64.64; only applies when it lies ahead of the current price
    pub sqrt_price_limit: u128,
    /// Minimum out (exact in) or maximum in (exact out); zero disables
    pub amount_limit: u64,
    pub a_to_b: bool,
    pub by_amount_in: bool,
    pub protocol_fee_rate: u16,
}

/// Result of a swap estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapEstimate {
    /// The requested amount could not be filled within the supplied ticks
    pub is_exceed: bool,
    /// Input including fees
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub protocol_fee_amount: u64,
    /// Q64.64 price after the swap
    pub end_sqrt_price: u128,
    pub ticks_crossed: u32,
}

/// Pure swap estimator; identical requests give identical estimates
pub trait SwapSimulator: Send + Sync {
    fn simulate(&self, request: &SwapRequest<'_>) -> SimulationResult<SwapEstimate>;
}

/// Simulator reproducing the on-chain swap loop
#[derive(Debug, Clone, Copy, Default)]
pub struct CremaSwapSimulator;

// =============================================================================
// STEP MATH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepResult {
    amount_in: u64,
    amount_out: u64,
    next_sqrt_price: u128,
    fee_amount: u64,
}

fn math_err(err: orca_whirlpools_core::CoreError) -> SimulationError {
    SimulationError::Math(err)
}

/// Input needed to move from `current` to `target`, rounded up
///
/// Saturates at `u64::MAX`, which only ever compares as "more than enough".
fn delta_up_from_input(current: u128, target: u128, liquidity: u128, a_to_b: bool) -> u64 {
    let delta = if a_to_b {
        try_get_amount_delta_a(U128::from(target), U128::from(current), U128::from(liquidity), true)
    } else {
        try_get_amount_delta_b(U128::from(current), U128::from(target), U128::from(liquidity), true)
    };
    delta.unwrap_or(u64::MAX)
}

/// Output released moving from `current` to `target`, rounded down
fn delta_down_from_output(current: u128, target: u128, liquidity: u128, a_to_b: bool) -> u64 {
    let delta = if a_to_b {
        try_get_amount_delta_b(U128::from(target), U128::from(current), U128::from(liquidity), false)
    } else {
        try_get_amount_delta_a(U128::from(current), U128::from(target), U128::from(liquidity), false)
    };
    delta.unwrap_or(u64::MAX)
}

fn next_sqrt_price_from_input(
    current: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
) -> SimulationResult<u128> {
    let next = if a_to_b {
        try_get_next_sqrt_price_from_a(U128::from(current), U128::from(liquidity), amount, true)
    } else {
        try_get_next_sqrt_price_from_b(U128::from(current), U128::from(liquidity), amount, true)
    };
    next.map(Into::into).map_err(math_err)
}

fn next_sqrt_price_from_output(
    current: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
) -> SimulationResult<u128> {
    let next = if a_to_b {
        try_get_next_sqrt_price_from_b(U128::from(current), U128::from(liquidity), amount, false)
    } else {
        try_get_next_sqrt_price_from_a(U128::from(current), U128::from(liquidity), amount, false)
    };
    next.map(Into::into).map_err(math_err)
}

/// `ceil(amount_in * fee_rate / (1e6 - fee_rate))`
fn fee_on_input(amount_in: u64, fee_rate: u64) -> SimulationResult<u64> {
    let numerator = amount_in as u128 * fee_rate as u128;
    let denominator = (FEE_RATE_DENOMINATOR - fee_rate) as u128;
    u64::try_from(numerator.div_ceil(denominator)).map_err(|_| SimulationError::AmountOverflow)
}

fn compute_swap_step(
    current: u128,
    target: u128,
    liquidity: u128,
    amount: u64,
    fee_rate: u64,
    by_amount_in: bool,
) -> SimulationResult<StepResult> {
    if liquidity == 0 {
        return Ok(StepResult {
            amount_in: 0,
            amount_out: 0,
            next_sqrt_price: target,
            fee_amount: 0,
        });
    }
    let a_to_b = current >= target;

    if by_amount_in {
        let amount_remain = (amount as u128 * (FEE_RATE_DENOMINATOR - fee_rate) as u128
            / FEE_RATE_DENOMINATOR as u128) as u64;
        let max_amount_in = delta_up_from_input(current, target, liquidity, a_to_b);

        let (amount_in, fee_amount, next_sqrt_price) = if max_amount_in > amount_remain {
            let next = next_sqrt_price_from_input(current, liquidity, amount_remain, a_to_b)?;
            (amount_remain, amount - amount_remain, next)
        } else {
            (max_amount_in, fee_on_input(max_amount_in, fee_rate)?, target)
        };
        let amount_out = delta_down_from_output(current, next_sqrt_price, liquidity, a_to_b);
        Ok(StepResult {
            amount_in,
            amount_out,
            next_sqrt_price,
            fee_amount,
        })
    } else {
        let max_amount_out = delta_down_from_output(current, target, liquidity, a_to_b);
        let (amount_out, next_sqrt_price) = if max_amount_out > amount {
            (amount, next_sqrt_price_from_output(current, liquidity, amount, a_to_b)?)
        } else {
            (max_amount_out, target)
        };
        let amount_in = delta_up_from_input(current, next_sqrt_price, liquidity, a_to_b);
        Ok(StepResult {
            amount_in,
            amount_out,
            next_sqrt_price,
            fee_amount: fee_on_input(amount_in, fee_rate)?,
        })
    }
}

// =============================================================================
// SWAP LOOP
// =============================================================================

enum Target<'a> {
    Tick(&'a Tick),
    /// Edge of the supplied window; nothing is known beyond it
    Edge(u128),
}

impl Target<'_> {
    fn sqrt_price(&self) -> u128 {
        match self {
            Target::Tick(tick) => tick.sqrt_price,
            Target::Edge(sqrt_price) => *sqrt_price,
        }
    }
}

/// Initialized ticks in swap order, followed by the window edge
fn swap_targets<'a>(request: &SwapRequest<'a>) -> SimulationResult<Vec<Target<'a>>> {
    let pool = request.pool;
    let arrays: &'a [&'a TickArray] = request.tick_arrays;
    let mut ticks: Vec<&'a Tick> = arrays
        .iter()
        .copied()
        .flat_map(|array| array.initialized_ticks())
        .filter(|tick| {
            if request.a_to_b {
                // A tick at the current price is crossed by a zero-size step
                tick.index <= pool.current_tick_index
            } else {
                tick.index > pool.current_tick_index
            }
        })
        .collect();
    if request.a_to_b {
        ticks.sort_by(|a, b| b.index.cmp(&a.index));
    } else {
        ticks.sort_by_key(|tick| tick.index);
    }
    ticks.dedup_by_key(|tick| tick.index);

    let mut targets: Vec<Target> = ticks.into_iter().map(Target::Tick).collect();

    let mut starts = Vec::with_capacity(request.tick_arrays.len());
    for array in arrays {
        starts.push(array.start_tick_index()?);
    }
    let edge_tick = if request.a_to_b {
        starts.iter().min().copied()
    } else {
        match starts.iter().max() {
            Some(start) => {
                Some(start + tick_array_spacing(pool.tick_spacing)?)
            }
            None => None,
        }
    };
    if let Some(edge_tick) = edge_tick {
        let edge_tick = edge_tick.clamp(MIN_TICK_INDEX, MAX_TICK_INDEX);
        let edge: u128 = tick_index_to_sqrt_price(edge_tick).into();
        let last = targets
            .last()
            .map(Target::sqrt_price)
            .unwrap_or(pool.current_sqrt_price);
        let beyond = if request.a_to_b { edge < last } else { edge > last };
        if beyond {
            targets.push(Target::Edge(edge));
        }
    }
    Ok(targets)
}

fn apply_liquidity_net(liquidity: u128, tick: &Tick, a_to_b: bool) -> SimulationResult<u128> {
    let change = if a_to_b {
        tick.liquidity_net.checked_neg()
    } else {
        Some(tick.liquidity_net)
    };
    let overflow = SimulationError::LiquidityOverflow { tick: tick.index };
    let change = change.ok_or(overflow.clone())?;
    if change >= 0 {
        liquidity.checked_add(change.unsigned_abs()).ok_or(overflow)
    } else {
        liquidity.checked_sub(change.unsigned_abs()).ok_or(overflow)
    }
}

impl SwapSimulator for CremaSwapSimulator {
    fn simulate(&self, request: &SwapRequest<'_>) -> SimulationResult<SwapEstimate> {
        let pool = request.pool;
        let a_to_b = request.a_to_b;
        let fee_rate = (pool.fee_rate as u64).min(FEE_RATE_DENOMINATOR - 1);

        let limit_ahead = if a_to_b {
            request.sqrt_price_limit < pool.current_sqrt_price
        } else {
            request.sqrt_price_limit > pool.current_sqrt_price
        };
        let limit = limit_ahead.then_some(request.sqrt_price_limit);

        let mut remaining = request.amount;
        let mut liquidity = pool.liquidity;
        let mut current_sqrt_price = pool.current_sqrt_price;
        let mut estimate = SwapEstimate::default();

        for target in swap_targets(request)? {
            if remaining == 0 {
                break;
            }
            let target_price = target.sqrt_price();
            let step_target = match limit {
                Some(limit) if a_to_b && limit > target_price => limit,
                Some(limit) if !a_to_b && limit < target_price => limit,
                _ => target_price,
            };

            let step = compute_swap_step(
                current_sqrt_price,
                step_target,
                liquidity,
                remaining,
                fee_rate,
                request.by_amount_in,
            )?;

            if step.amount_in != 0 {
                let consumed = if request.by_amount_in {
                    step.amount_in.saturating_add(step.fee_amount)
                } else {
                    step.amount_out
                };
                remaining = remaining.saturating_sub(consumed);
            }
            estimate.amount_in = estimate
                .amount_in
                .checked_add(step.amount_in)
                .ok_or(SimulationError::AmountOverflow)?;
            estimate.amount_out = estimate
                .amount_out
                .checked_add(step.amount_out)
                .ok_or(SimulationError::AmountOverflow)?;
            estimate.fee_amount = estimate
                .fee_amount
                .checked_add(step.fee_amount)
                .ok_or(SimulationError::AmountOverflow)?;

            current_sqrt_price = step.next_sqrt_price;
            match target {
                Target::Tick(tick) if step.next_sqrt_price == tick.sqrt_price => {
                    liquidity = apply_liquidity_net(liquidity, tick, a_to_b)?;
                    estimate.ticks_crossed += 1;
                }
                _ => {}
            }
            if limit == Some(current_sqrt_price) {
                break;
            }
        }

        estimate.amount_in = estimate
            .amount_in
            .checked_add(estimate.fee_amount)
            .ok_or(SimulationError::AmountOverflow)?;
        estimate.end_sqrt_price = current_sqrt_price;
        estimate.is_exceed = remaining > 0;
        estimate.protocol_fee_amount = protocol_fee(estimate.fee_amount, request.protocol_fee_rate)
            .ok_or(SimulationError::AmountOverflow)?;

        if request.amount_limit != 0 {
            if request.by_amount_in && estimate.amount_out < request.amount_limit {
                return Err(SimulationError::AmountLimitExceeded {
                    limit: request.amount_limit,
                    estimate: estimate.amount_out,
                });
            }
            if !request.by_amount_in && estimate.amount_in > request.amount_limit {
                return Err(SimulationError::AmountLimitExceeded {
                    limit: request.amount_limit,
                    estimate: estimate.amount_in,
                });
            }
        }

        Ok(estimate)
    }
}
