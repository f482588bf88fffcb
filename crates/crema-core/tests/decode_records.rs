//! # Record Decoding Tests
//!
//! Encodes records with independent encoders (borsh for Crema accounts,
//! `spl_token` packing for SPL layouts) and checks the schema-driven
//! decoder reads them back field for field.

use borsh::BorshSerialize;
use crema_core::{
    decode, decode_as,
    schema::{AccountKind, POOL_SCHEMA, TICK_ARRAY_SCHEMA},
    ClmmConfig, Clmmpool, DecodeError, DecodedAccount, FeeTier, Partner, Position,
    PositionReward, Rewarder, Tick, TickArray, TokenAccountState,
};
use solana_program::pubkey::Pubkey;

fn encode<T: BorshSerialize>(kind: AccountKind, record: &T) -> Vec<u8> {
    let mut data = kind.discriminator().unwrap().to_vec();
    data.extend(borsh::to_vec(record).unwrap());
    data
}

fn sample_pool() -> Clmmpool {
    Clmmpool {
        clmm_config: Pubkey::new_unique(),
        token_a: Pubkey::new_unique(),
        token_b: Pubkey::new_unique(),
        token_a_vault: Pubkey::new_unique(),
        token_b_vault: Pubkey::new_unique(),
        tick_spacing: 60,
        tick_spacing_seed: 60u16.to_le_bytes(),
        fee_rate: 3000,
        liquidity: 1_234_567_890_123,
        current_sqrt_price: 1u128 << 64,
        current_tick_index: -7,
        fee_growth_global_a: u128::MAX - 1,
        fee_growth_global_b: 42,
        fee_protocol_token_a: 11,
        fee_protocol_token_b: 12,
        bump: [254],
        rewarder_infos: [
            Rewarder {
                mint: Pubkey::new_unique(),
                emissions_per_second: 99,
                ..Default::default()
            },
            Rewarder::default(),
            Rewarder::default(),
        ],
        rewarder_last_updated_time: 1_700_000_000,
        is_pause: true,
    }
}

#[test]
fn test_pool_decodes_field_for_field() {
    let pool = sample_pool();
    let data = encode(AccountKind::Pool, &pool);
    assert_eq!(data.len(), 8 + POOL_SCHEMA.min_size());

    let decoded: Clmmpool = decode_as(&data).unwrap();
    assert_eq!(decoded, pool);
    assert_eq!(decoded.initialized_rewarders().count(), 1);
}

#[test]
fn test_tick_array_decodes_nested_ticks() {
    let mut array = TickArray {
        array_index: 115,
        tick_spacing: 60,
        clmmpool: Pubkey::new_unique(),
        ..Default::default()
    };
    array.ticks[5] = Tick {
        is_initialized: true,
        index: 300,
        sqrt_price: 18_455_969_290_605_287_889,
        liquidity_net: -5_000,
        liquidity_gross: 5_000,
        fee_growth_outside_a: 1,
        fee_growth_outside_b: 2,
        reward_growth_outside: [3, 4, 5],
    };
    let data = encode(AccountKind::TickArray, &array);
    assert_eq!(data.len(), 8 + TICK_ARRAY_SCHEMA.min_size());

    match decode(AccountKind::TickArray, &data).unwrap() {
        DecodedAccount::TickArray(decoded) => assert_eq!(*decoded, array),
        other => panic!("unexpected record {:?}", other.kind()),
    }
}

#[test]
fn test_small_records_decode() {
    let config = ClmmConfig {
        protocol_authority: Pubkey::new_unique(),
        protocol_fee_claim_authority: Pubkey::new_unique(),
        protocol_fee_rate: 2000,
        pending_authority: Pubkey::new_unique(),
        create_pool_authority: Pubkey::new_unique(),
    };
    assert_eq!(decode_as::<ClmmConfig>(&encode(AccountKind::Config, &config)).unwrap(), config);

    let fee_tier = FeeTier {
        fee_rate: 500,
        tick_spacing: 10,
        bump: 255,
    };
    assert_eq!(decode_as::<FeeTier>(&encode(AccountKind::FeeTier, &fee_tier)).unwrap(), fee_tier);

    let position = Position {
        clmmpool: Pubkey::new_unique(),
        position_nft_mint: Pubkey::new_unique(),
        liquidity: 77,
        tick_lower_index: -120,
        tick_upper_index: 120,
        fee_owed_b: 9,
        rewarder_infos: [
            PositionReward {
                growth_inside: 1,
                amount_owed: 2,
            },
            PositionReward::default(),
            PositionReward::default(),
        ],
        ..Default::default()
    };
    assert_eq!(decode_as::<Position>(&encode(AccountKind::Position, &position)).unwrap(), position);

    let rewarder = Rewarder {
        mint_wrapper: Pubkey::new_unique(),
        growth_global: 8,
        ..Default::default()
    };
    assert_eq!(decode_as::<Rewarder>(&encode(AccountKind::Rewarder, &rewarder)).unwrap(), rewarder);
}

#[test]
fn test_partner_name_is_variable_length() {
    let partner = Partner {
        base: Pubkey::new_unique(),
        fee_rate: 100,
        bump: [1],
        start_time: 10,
        end_time: 20,
        name: "router-partner".to_string(),
        ..Default::default()
    };
    let data = encode(AccountKind::Partner, &partner);
    assert_eq!(decode_as::<Partner>(&data).unwrap(), partner);

    let err = decode_as::<Partner>(&data[..data.len() - 3]).unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedInput { field: "name", .. }));
}

#[test]
fn test_truncated_pool_is_rejected() {
    let data = encode(AccountKind::Pool, &sample_pool());
    let err = decode(AccountKind::Pool, &data[..data.len() - 1]).unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedInput { kind: AccountKind::Pool, .. }));
}

#[test]
fn test_pool_with_invalid_pause_flag_is_malformed() {
    let mut data = encode(AccountKind::Pool, &sample_pool());
    let last = data.len() - 1;
    data[last] = 7;
    let err = decode(AccountKind::Pool, &data).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedField { field: "is_pause", .. }));
}

#[test]
fn test_every_kind_rejects_other_discriminators() {
    let fixed_kinds = [
        AccountKind::Config,
        AccountKind::FeeTier,
        AccountKind::Pool,
        AccountKind::TickArray,
        AccountKind::Position,
        AccountKind::Rewarder,
    ];
    for expected in fixed_kinds {
        let len = expected.schema().min_account_size();
        for other in fixed_kinds.iter().filter(|k| **k != expected) {
            let mut data = vec![0u8; len];
            data[..8].copy_from_slice(&other.discriminator().unwrap());
            let err = decode(expected, &data).unwrap_err();
            assert!(
                matches!(err, DecodeError::WrongAccountKind { expected: e, .. } if e == expected),
                "{} decoded as {}",
                other,
                expected
            );
        }
    }
}

#[test]
fn test_tick_array_with_zero_spacing_is_malformed() {
    let array = TickArray::default();
    let err = decode_as::<TickArray>(&encode(AccountKind::TickArray, &array)).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedField { field: "tick_spacing", .. }));
}

mod spl {
    use super::*;
    use crema_core::{Mint, TokenAccount};
    use spl_token::solana_program::{
        program_option::COption, program_pack::Pack, pubkey::Pubkey as SplPubkey,
    };
    use spl_token::state::{Account, AccountState, Mint as SplMint};

    #[test]
    fn test_token_account_matches_spl_pack() {
        let delegate = SplPubkey::new_unique();
        let account = Account {
            mint: SplPubkey::new_unique(),
            owner: SplPubkey::new_unique(),
            amount: 5_000_000,
            delegate: COption::Some(delegate),
            state: AccountState::Frozen,
            is_native: COption::None,
            delegated_amount: 1_000,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; Account::LEN];
        Account::pack(account, &mut data).unwrap();

        let decoded: TokenAccount = decode_as(&data).unwrap();
        assert_eq!(decoded.mint.to_bytes(), account.mint.to_bytes());
        assert_eq!(decoded.owner.to_bytes(), account.owner.to_bytes());
        assert_eq!(decoded.amount, 5_000_000);
        assert_eq!(decoded.delegate.map(|d| d.to_bytes()), Some(delegate.to_bytes()));
        assert_eq!(decoded.state, TokenAccountState::Frozen);
        assert_eq!(decoded.is_native, None);
        assert_eq!(decoded.delegated_amount, 1_000);
        assert_eq!(decoded.close_authority, None);
    }

    #[test]
    fn test_mint_matches_spl_pack() {
        let authority = SplPubkey::new_unique();
        let mint = SplMint {
            mint_authority: COption::Some(authority),
            supply: 21_000_000,
            decimals: 9,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; SplMint::LEN];
        SplMint::pack(mint, &mut data).unwrap();

        let decoded: Mint = decode_as(&data).unwrap();
        assert_eq!(decoded.mint_authority.map(|a| a.to_bytes()), Some(authority.to_bytes()));
        assert_eq!(decoded.supply, 21_000_000);
        assert_eq!(decoded.decimals, 9);
        assert!(decoded.is_initialized);
        assert_eq!(decoded.freeze_authority, None);
    }
}
