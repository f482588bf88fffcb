use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::DecodeResult,
    schema::AccountKind,
};

/// Global program configuration shared by every pool
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClmmConfig {
    pub protocol_authority: Pubkey,
    pub protocol_fee_claim_authority: Pubkey,
    /// Share of swap fees kept by the protocol, over 10_000
    pub protocol_fee_rate: u16,
    pub pending_authority: Pubkey,
    pub create_pool_authority: Pubkey,
}

impl AccountRecord for ClmmConfig {
    const KIND: AccountKind = AccountKind::Config;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            protocol_authority: reader.pubkey()?,
            protocol_fee_claim_authority: reader.pubkey()?,
            protocol_fee_rate: reader.u16()?,
            pending_authority: reader.pubkey()?,
            create_pool_authority: reader.pubkey()?,
        })
    }
}
