use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use super::Rewarder;
use crate::{
    constants::REWARDER_NUM,
    decoder::{AccountRecord, FieldReader},
    errors::{DecodeError, DecodeResult},
    schema::AccountKind,
};

/// Concentrated-liquidity pool of a token pair
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Clmmpool {
    pub clmm_config: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub token_a_vault: Pubkey,
    pub token_b_vault: Pubkey,
    pub tick_spacing: u16,
    pub tick_spacing_seed: [u8; 2],
    /// Swap fee rate over 1_000_000
    pub fee_rate: u16,
    /// Liquidity active at the current price
    pub liquidity: u128,
    /// Q64.64
    pub current_sqrt_price: u128,
    pub current_tick_index: i32,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
    pub fee_protocol_token_a: u64,
    pub fee_protocol_token_b: u64,
    pub bump: [u8; 1],
    pub rewarder_infos: [Rewarder; REWARDER_NUM],
    pub rewarder_last_updated_time: u64,
    pub is_pause: bool,
}

impl Clmmpool {
    pub fn reserve_mints(&self) -> [Pubkey; 2] {
        [self.token_a, self.token_b]
    }

    pub fn initialized_rewarders(&self) -> impl Iterator<Item = &Rewarder> {
        self.rewarder_infos.iter().filter(|r| r.is_initialized())
    }
}

impl AccountRecord for Clmmpool {
    const KIND: AccountKind = AccountKind::Pool;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        let clmm_config = reader.pubkey()?;
        let token_a = reader.pubkey()?;
        let token_b = reader.pubkey()?;
        let token_a_vault = reader.pubkey()?;
        let token_b_vault = reader.pubkey()?;
        let tick_spacing = reader.u16()?;
        let tick_spacing_seed = reader.bytes()?;
        let fee_rate = reader.u16()?;
        let liquidity = reader.u128()?;
        let current_sqrt_price = reader.u128()?;
        let current_tick_index = reader.i32()?;
        let fee_growth_global_a = reader.u128()?;
        let fee_growth_global_b = reader.u128()?;
        let fee_protocol_token_a = reader.u64()?;
        let fee_protocol_token_b = reader.u64()?;
        let bump = reader.bytes()?;
        let rewarders = reader.structs(Rewarder::from_fields)?;
        let rewarder_infos = rewarders.try_into().map_err(|_| {
            DecodeError::malformed(Self::KIND, "rewarder_infos", "expected 3 entries")
        })?;
        let rewarder_last_updated_time = reader.u64()?;
        let is_pause = reader.bool()?;

        Ok(Self {
            clmm_config,
            token_a,
            token_b,
            token_a_vault,
            token_b_vault,
            tick_spacing,
            tick_spacing_seed,
            fee_rate,
            liquidity,
            current_sqrt_price,
            current_tick_index,
            fee_growth_global_a,
            fee_growth_global_b,
            fee_protocol_token_a,
            fee_protocol_token_b,
            bump,
            rewarder_infos,
            rewarder_last_updated_time,
            is_pause,
        })
    }
}
