use borsh::BorshSerialize;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::DecodeResult,
    schema::AccountKind,
};

/// Fee rate registered for one tick spacing
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeTier {
    pub fee_rate: u16,
    pub tick_spacing: u16,
    pub bump: u8,
}

impl AccountRecord for FeeTier {
    const KIND: AccountKind = AccountKind::FeeTier;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            fee_rate: reader.u16()?,
            tick_spacing: reader.u16()?,
            bump: reader.u8()?,
        })
    }
}
