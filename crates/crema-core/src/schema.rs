//! # Schema Catalog
//!
//! Ordered field descriptors for every account kind a Crema pool touches.
//! The decoder walks these tables; the typed records in [`crate::state`]
//! read the decoded values back in the same order.
//!
//! Crema accounts are Anchor accounts: an 8-byte discriminator followed by
//! the Borsh-encoded fields. SPL token accounts and mints carry no
//! discriminator and use 4-byte-tag `COption`s with fixed-width payloads.

use std::fmt;

use solana_program::hash::hashv;

use crate::constants::{DISCRIMINATOR_LEN, PUBKEY_LEN, REWARDER_NUM, TICK_ARRAY_SIZE};

/// Account kinds understood by the decoder, one schema each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Config,
    FeeTier,
    Pool,
    TickArray,
    Position,
    Partner,
    Rewarder,
    TokenAccount,
    Mint,
}

impl AccountKind {
    pub const ALL: [AccountKind; 9] = [
        AccountKind::Config,
        AccountKind::FeeTier,
        AccountKind::Pool,
        AccountKind::TickArray,
        AccountKind::Position,
        AccountKind::Partner,
        AccountKind::Rewarder,
        AccountKind::TokenAccount,
        AccountKind::Mint,
    ];

    /// Account struct name as declared by the on-chain program
    pub fn account_name(&self) -> &'static str {
        match self {
            AccountKind::Config => "ClmmConfig",
            AccountKind::FeeTier => "FeeTier",
            AccountKind::Pool => "Clmmpool",
            AccountKind::TickArray => "TickArray",
            AccountKind::Position => "Position",
            AccountKind::Partner => "Partner",
            AccountKind::Rewarder => "Rewarder",
            AccountKind::TokenAccount => "TokenAccount",
            AccountKind::Mint => "Mint",
        }
    }

    /// Anchor discriminator: `sha256("account:<Name>")[..8]`
    ///
    /// `None` for SPL token layouts, which are identified by length only.
    pub fn discriminator(&self) -> Option<[u8; DISCRIMINATOR_LEN]> {
        if self.is_spl_layout() {
            return None;
        }
        let hash = hashv(&[b"account:", self.account_name().as_bytes()]);
        let mut tag = [0u8; DISCRIMINATOR_LEN];
        tag.copy_from_slice(&hash.to_bytes()[..DISCRIMINATOR_LEN]);
        Some(tag)
    }

    pub fn is_spl_layout(&self) -> bool {
        matches!(self, AccountKind::TokenAccount | AccountKind::Mint)
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            AccountKind::Config => &CONFIG_SCHEMA,
            AccountKind::FeeTier => &FEE_TIER_SCHEMA,
            AccountKind::Pool => &POOL_SCHEMA,
            AccountKind::TickArray => &TICK_ARRAY_SCHEMA,
            AccountKind::Position => &POSITION_SCHEMA,
            AccountKind::Partner => &PARTNER_SCHEMA,
            AccountKind::Rewarder => &REWARDER_SCHEMA,
            AccountKind::TokenAccount => &TOKEN_ACCOUNT_SCHEMA,
            AccountKind::Mint => &MINT_SCHEMA,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.account_name())
    }
}

/// Encoded type of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// One byte, strictly 0 or 1
    Bool,
    /// 32-byte address
    Pubkey,
    /// Fixed-length raw bytes
    Bytes(usize),
    /// u32 little-endian length prefix followed by UTF-8 bytes
    String,
    /// 1-byte presence flag, payload only when present
    Option(&'static FieldType),
    /// 4-byte presence tag, payload always present
    COption(&'static FieldType),
    /// Fixed number of homogeneous elements
    Array(&'static FieldType, usize),
    /// Nested record
    Struct(&'static [Field]),
}

impl FieldType {
    /// Smallest number of bytes this type can occupy
    pub fn min_size(&self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 | FieldType::Bool => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 => 4,
            FieldType::U64 | FieldType::I64 => 8,
            FieldType::U128 | FieldType::I128 => 16,
            FieldType::Pubkey => PUBKEY_LEN,
            FieldType::Bytes(len) => *len,
            FieldType::String => 4,
            FieldType::Option(_) => 1,
            FieldType::COption(inner) => 4 + inner.min_size(),
            FieldType::Array(inner, len) => inner.min_size() * len,
            FieldType::Struct(fields) => fields.iter().map(|field| field.ty.min_size()).sum(),
        }
    }

    /// Whether every encoding of this type has the same width
    pub fn is_fixed_size(&self) -> bool {
        match self {
            FieldType::String | FieldType::Option(_) => false,
            FieldType::COption(inner) | FieldType::Array(inner, _) => inner.is_fixed_size(),
            FieldType::Struct(fields) => fields.iter().all(|field| field.ty.is_fixed_size()),
            _ => true,
        }
    }
}

/// Named field in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Complete layout of one account kind
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: AccountKind,
    pub fields: &'static [Field],
}

impl Schema {
    /// Minimum body size, excluding the discriminator
    pub fn min_size(&self) -> usize {
        self.fields.iter().map(|field| field.ty.min_size()).sum()
    }

    pub fn is_fixed_size(&self) -> bool {
        self.fields.iter().all(|field| field.ty.is_fixed_size())
    }

    /// Minimum size of the full account data
    pub fn min_account_size(&self) -> usize {
        let tag = if self.kind.is_spl_layout() { 0 } else { DISCRIMINATOR_LEN };
        tag + self.min_size()
    }
}

// =============================================================================
// NESTED RECORDS
// =============================================================================

const REWARDER_FIELDS: &[Field] = &[
    Field::new("mint_wrapper", FieldType::Pubkey),
    Field::new("minter", FieldType::Pubkey),
    Field::new("mint", FieldType::Pubkey),
    Field::new("authority", FieldType::Pubkey),
    Field::new("emissions_per_second", FieldType::U128),
    Field::new("growth_global", FieldType::U128),
];

const TICK_FIELDS: &[Field] = &[
    Field::new("is_initialized", FieldType::Bool),
    Field::new("index", FieldType::I32),
    Field::new("sqrt_price", FieldType::U128),
    Field::new("liquidity_net", FieldType::I128),
    Field::new("liquidity_gross", FieldType::U128),
    Field::new("fee_growth_outside_a", FieldType::U128),
    Field::new("fee_growth_outside_b", FieldType::U128),
    Field::new("reward_growth_outside", FieldType::Array(&FieldType::U128, REWARDER_NUM)),
];

const POSITION_REWARD_FIELDS: &[Field] = &[
    Field::new("growth_inside", FieldType::U128),
    Field::new("amount_owed", FieldType::U64),
];

// =============================================================================
// ACCOUNT SCHEMAS
// =============================================================================

pub static CONFIG_SCHEMA: Schema = Schema {
    kind: AccountKind::Config,
    fields: &[
        Field::new("protocol_authority", FieldType::Pubkey),
        Field::new("protocol_fee_claim_authority", FieldType::Pubkey),
        Field::new("protocol_fee_rate", FieldType::U16),
        Field::new("pending_authority", FieldType::Pubkey),
        Field::new("create_pool_authority", FieldType::Pubkey),
    ],
};

pub static FEE_TIER_SCHEMA: Schema = Schema {
    kind: AccountKind::FeeTier,
    fields: &[
        Field::new("fee_rate", FieldType::U16),
        Field::new("tick_spacing", FieldType::U16),
        Field::new("bump", FieldType::U8),
    ],
};

pub static POOL_SCHEMA: Schema = Schema {
    kind: AccountKind::Pool,
    fields: &[
        Field::new("clmm_config", FieldType::Pubkey),
        Field::new("token_a", FieldType::Pubkey),
        Field::new("token_b", FieldType::Pubkey),
        Field::new("token_a_vault", FieldType::Pubkey),
        Field::new("token_b_vault", FieldType::Pubkey),
        Field::new("tick_spacing", FieldType::U16),
        Field::new("tick_spacing_seed", FieldType::Bytes(2)),
        Field::new("fee_rate", FieldType::U16),
        Field::new("liquidity", FieldType::U128),
        Field::new("current_sqrt_price", FieldType::U128),
        Field::new("current_tick_index", FieldType::I32),
        Field::new("fee_growth_global_a", FieldType::U128),
        Field::new("fee_growth_global_b", FieldType::U128),
        Field::new("fee_protocol_token_a", FieldType::U64),
        Field::new("fee_protocol_token_b", FieldType::U64),
        Field::new("bump", FieldType::Bytes(1)),
        Field::new(
            "rewarder_infos",
            FieldType::Array(&FieldType::Struct(REWARDER_FIELDS), REWARDER_NUM),
        ),
        Field::new("rewarder_last_updated_time", FieldType::U64),
        Field::new("is_pause", FieldType::Bool),
    ],
};

pub static TICK_ARRAY_SCHEMA: Schema = Schema {
    kind: AccountKind::TickArray,
    fields: &[
        Field::new("array_index", FieldType::U16),
        Field::new("tick_spacing", FieldType::U16),
        Field::new("clmmpool", FieldType::Pubkey),
        Field::new(
            "ticks",
            FieldType::Array(&FieldType::Struct(TICK_FIELDS), TICK_ARRAY_SIZE),
        ),
    ],
};

pub static POSITION_SCHEMA: Schema = Schema {
    kind: AccountKind::Position,
    fields: &[
        Field::new("clmmpool", FieldType::Pubkey),
        Field::new("position_nft_mint", FieldType::Pubkey),
        Field::new("liquidity", FieldType::U128),
        Field::new("tick_lower_index", FieldType::I32),
        Field::new("tick_upper_index", FieldType::I32),
        Field::new("fee_growth_inside_a", FieldType::U128),
        Field::new("fee_owed_a", FieldType::U64),
        Field::new("fee_growth_inside_b", FieldType::U128),
        Field::new("fee_owed_b", FieldType::U64),
        Field::new(
            "rewarder_infos",
            FieldType::Array(&FieldType::Struct(POSITION_REWARD_FIELDS), REWARDER_NUM),
        ),
    ],
};

pub static PARTNER_SCHEMA: Schema = Schema {
    kind: AccountKind::Partner,
    fields: &[
        Field::new("partner_fee_claim_authority", FieldType::Pubkey),
        Field::new("pending_authority", FieldType::Pubkey),
        Field::new("base", FieldType::Pubkey),
        Field::new("fee_rate", FieldType::U16),
        Field::new("bump", FieldType::Bytes(1)),
        Field::new("start_time", FieldType::U64),
        Field::new("end_time", FieldType::U64),
        Field::new("name", FieldType::String),
    ],
};

pub static REWARDER_SCHEMA: Schema = Schema {
    kind: AccountKind::Rewarder,
    fields: REWARDER_FIELDS,
};

pub static TOKEN_ACCOUNT_SCHEMA: Schema = Schema {
    kind: AccountKind::TokenAccount,
    fields: &[
        Field::new("mint", FieldType::Pubkey),
        Field::new("owner", FieldType::Pubkey),
        Field::new("amount", FieldType::U64),
        Field::new("delegate", FieldType::COption(&FieldType::Pubkey)),
        Field::new("state", FieldType::U8),
        Field::new("is_native", FieldType::COption(&FieldType::U64)),
        Field::new("delegated_amount", FieldType::U64),
        Field::new("close_authority", FieldType::COption(&FieldType::Pubkey)),
    ],
};

pub static MINT_SCHEMA: Schema = Schema {
    kind: AccountKind::Mint,
    fields: &[
        Field::new("mint_authority", FieldType::COption(&FieldType::Pubkey)),
        Field::new("supply", FieldType::U64),
        Field::new("decimals", FieldType::U8),
        Field::new("is_initialized", FieldType::Bool),
        Field::new("freeze_authority", FieldType::COption(&FieldType::Pubkey)),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sizes_match_program_layouts() {
        assert_eq!(CONFIG_SCHEMA.min_size(), 4 * 32 + 2);
        assert_eq!(FEE_TIER_SCHEMA.min_size(), 5);
        // Clmmpool::LEN of the on-chain program
        assert_eq!(
            POOL_SCHEMA.min_size(),
            5 * 32 + 3 * 2 + 2 * 16 + 4 + 2 * 16 + 2 * 8 + 1 + 3 * 160 + 8 + 1
        );
        // TickArray::LEN: header + 64 ticks of 133 bytes
        assert_eq!(TICK_ARRAY_SCHEMA.min_size(), 2 + 2 + 32 + 64 * 133);
        assert_eq!(TOKEN_ACCOUNT_SCHEMA.min_size(), 165);
        assert_eq!(MINT_SCHEMA.min_size(), 82);
    }

    #[test]
    fn test_fixed_size_kinds() {
        for kind in AccountKind::ALL {
            let expected = kind != AccountKind::Partner;
            assert_eq!(kind.schema().is_fixed_size(), expected, "{}", kind);
        }
    }

    #[test]
    fn test_discriminators_are_distinct() {
        let tags: Vec<[u8; 8]> = AccountKind::ALL
            .iter()
            .filter_map(|kind| kind.discriminator())
            .collect();
        assert_eq!(tags.len(), 7);
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_spl_layouts_have_no_discriminator() {
        assert!(AccountKind::TokenAccount.discriminator().is_none());
        assert!(AccountKind::Mint.discriminator().is_none());
        assert_eq!(TOKEN_ACCOUNT_SCHEMA.min_account_size(), 165);
        assert_eq!(POOL_SCHEMA.min_account_size(), 8 + POOL_SCHEMA.min_size());
    }

    #[test]
    fn test_schema_lookup_matches_kind() {
        for kind in AccountKind::ALL {
            assert_eq!(kind.schema().kind, kind);
        }
    }
}
