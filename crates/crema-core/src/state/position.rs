use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::{DecodeError, DecodeResult},
    schema::AccountKind,
};

#[derive(BorshSerialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionReward {
    pub growth_inside: u128,
    pub amount_owed: u64,
}

/// Liquidity position owned through an NFT
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub clmmpool: Pubkey,
    pub position_nft_mint: Pubkey,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_inside_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_inside_b: u128,
    pub fee_owed_b: u64,
    pub rewarder_infos: [PositionReward; 3],
}

impl AccountRecord for Position {
    const KIND: AccountKind = AccountKind::Position;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        let clmmpool = reader.pubkey()?;
        let position_nft_mint = reader.pubkey()?;
        let liquidity = reader.u128()?;
        let tick_lower_index = reader.i32()?;
        let tick_upper_index = reader.i32()?;
        let fee_growth_inside_a = reader.u128()?;
        let fee_owed_a = reader.u64()?;
        let fee_growth_inside_b = reader.u128()?;
        let fee_owed_b = reader.u64()?;
        let rewards = reader.structs(|r| {
            Ok(PositionReward {
                growth_inside: r.u128()?,
                amount_owed: r.u64()?,
            })
        })?;
        let rewarder_infos = rewards.try_into().map_err(|_| {
            DecodeError::malformed(Self::KIND, "rewarder_infos", "expected 3 entries")
        })?;

        Ok(Self {
            clmmpool,
            position_nft_mint,
            liquidity,
            tick_lower_index,
            tick_upper_index,
            fee_growth_inside_a,
            fee_owed_a,
            fee_growth_inside_b,
            fee_owed_b,
            rewarder_infos,
        })
    }
}
