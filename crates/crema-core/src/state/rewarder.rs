use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::DecodeResult,
    schema::AccountKind,
};

/// Reward emitter, embedded in pools and also stored standalone
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewarder {
    pub mint_wrapper: Pubkey,
    pub minter: Pubkey,
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub emissions_per_second: u128,
    pub growth_global: u128,
}

impl Rewarder {
    pub fn is_initialized(&self) -> bool {
        self.mint != Pubkey::default()
    }
}

impl AccountRecord for Rewarder {
    const KIND: AccountKind = AccountKind::Rewarder;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            mint_wrapper: reader.pubkey()?,
            minter: reader.pubkey()?,
            mint: reader.pubkey()?,
            authority: reader.pubkey()?,
            emissions_per_second: reader.u128()?,
            growth_global: reader.u128()?,
        })
    }
}
