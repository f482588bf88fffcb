use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::DecodeResult,
    schema::AccountKind,
};

/// Referral partner with a time-bounded fee share
#[derive(BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Partner {
    pub partner_fee_claim_authority: Pubkey,
    pub pending_authority: Pubkey,
    pub base: Pubkey,
    pub fee_rate: u16,
    pub bump: [u8; 1],
    pub start_time: u64,
    pub end_time: u64,
    pub name: String,
}

impl Partner {
    /// Whether the partner's fee share applies at unix time `now`
    pub fn is_active(&self, now: u64) -> bool {
        self.start_time <= now && now < self.end_time
    }
}

impl AccountRecord for Partner {
    const KIND: AccountKind = AccountKind::Partner;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            partner_fee_claim_authority: reader.pubkey()?,
            pending_authority: reader.pubkey()?,
            base: reader.pubkey()?,
            fee_rate: reader.u16()?,
            bump: reader.bytes()?,
            start_time: reader.u64()?,
            end_time: reader.u64()?,
            name: reader.string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_activity_window() {
        let partner = Partner {
            start_time: 100,
            end_time: 200,
            ..Default::default()
        };
        assert!(!partner.is_active(99));
        assert!(partner.is_active(100));
        assert!(partner.is_active(199));
        assert!(!partner.is_active(200));
    }
}
