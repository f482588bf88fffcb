use solana_program::pubkey::Pubkey;

use crate::{
    decoder::{AccountRecord, FieldReader},
    errors::{DecodeError, DecodeResult},
    schema::AccountKind,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenAccountState {
    #[default]
    Uninitialized,
    Initialized,
    Frozen,
}

impl TryFrom<u8> for TokenAccountState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Uninitialized),
            1 => Ok(Self::Initialized),
            2 => Ok(Self::Frozen),
            other => Err(other),
        }
    }
}

/// SPL token account, e.g. a pool vault
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: TokenAccountState,
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl AccountRecord for TokenAccount {
    const KIND: AccountKind = AccountKind::TokenAccount;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        let mint = reader.pubkey()?;
        let owner = reader.pubkey()?;
        let amount = reader.u64()?;
        let delegate = reader.option_pubkey()?;
        let state = TokenAccountState::try_from(reader.u8()?).map_err(|raw| {
            DecodeError::malformed(Self::KIND, "state", format!("unknown account state {}", raw))
        })?;
        Ok(Self {
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native: reader.option_u64()?,
            delegated_amount: reader.u64()?,
            close_authority: reader.option_pubkey()?,
        })
    }
}

/// SPL token mint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mint {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl AccountRecord for Mint {
    const KIND: AccountKind = AccountKind::Mint;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            mint_authority: reader.option_pubkey()?,
            supply: reader.u64()?,
            decimals: reader.u8()?,
            is_initialized: reader.bool()?,
            freeze_authority: reader.option_pubkey()?,
        })
    }
}
