//! Swap fee splits

use crate::constants::PROTOCOL_FEE_RATE_DENOMINATOR;

/// Protocol share of `fee_amount`, rounded up
///
/// `None` when the share does not fit a token amount, which only happens
/// for rates above the denominator.
pub fn protocol_fee(fee_amount: u64, protocol_fee_rate: u16) -> Option<u64> {
    let scaled = fee_amount as u128 * protocol_fee_rate as u128;
    u64::try_from(scaled.div_ceil(PROTOCOL_FEE_RATE_DENOMINATOR as u128)).ok()
}
