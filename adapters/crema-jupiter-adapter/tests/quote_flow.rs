//! End-to-end flow through the Jupiter interface: load a pool from its keyed
//! account, fetch what it asks for, update, then quote both directions.

use borsh::BorshSerialize;
use crema_jupiter_adapter::crema_core::{
    address::{fee_tier_address, tick_array_address},
    AccountKind, ClmmConfig, Clmmpool, FeeTier, TickArray, CREMA_PROGRAM_ID, Q64,
};
use crema_jupiter_adapter::{CremaAmm, QuoteError};
use jupiter_amm_interface::{
    AccountMap, Amm, AmmContext, ClockRef, KeyedAccount, QuoteParams, SwapMode,
};
use rust_decimal::Decimal;
use serde_json::json;
use solana_program::pubkey::Pubkey;
use solana_sdk::account::Account;

const CURRENT_ARRAY: u16 = 115;

fn encode<T: BorshSerialize>(kind: AccountKind, record: &T) -> Vec<u8> {
    let mut data = kind.discriminator().unwrap().to_vec();
    data.extend(borsh::to_vec(record).unwrap());
    data
}

fn crema_account(data: Vec<u8>) -> Account {
    Account {
        lamports: 1_000_000,
        data,
        owner: CREMA_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

struct Market {
    key: Pubkey,
    pool: Clmmpool,
}

impl Market {
    fn new() -> Self {
        Self {
            key: Pubkey::new_unique(),
            pool: Clmmpool {
                clmm_config: Pubkey::new_unique(),
                token_a: Pubkey::new_unique(),
                token_b: Pubkey::new_unique(),
                token_a_vault: Pubkey::new_unique(),
                token_b_vault: Pubkey::new_unique(),
                tick_spacing: 60,
                tick_spacing_seed: 60u16.to_le_bytes(),
                fee_rate: 3000,
                liquidity: 1_000_000_000_000,
                current_sqrt_price: Q64,
                current_tick_index: 0,
                ..Default::default()
            },
        }
    }

    fn keyed_account(&self) -> KeyedAccount {
        KeyedAccount {
            key: self.key,
            account: crema_account(encode(AccountKind::Pool, &self.pool)),
            params: Some(json!({ "decimalA": 6, "decimalB": 6 })),
        }
    }

    fn load(&self) -> CremaAmm {
        let context = AmmContext {
            clock_ref: ClockRef::default(),
        };
        CremaAmm::from_keyed_account(&self.keyed_account(), &context).unwrap()
    }

    fn tick_array_address(&self, array_index: u16) -> Pubkey {
        tick_array_address(&CREMA_PROGRAM_ID, &self.key, array_index).0
    }

    fn account_map(&self, pool: &Clmmpool) -> AccountMap {
        let config = ClmmConfig {
            protocol_fee_rate: 2000,
            ..Default::default()
        };
        let fee_tier = FeeTier {
            fee_rate: 3000,
            tick_spacing: 60,
            bump: 254,
        };
        let tick_array = TickArray {
            array_index: CURRENT_ARRAY,
            tick_spacing: 60,
            clmmpool: self.key,
            ..Default::default()
        };

        let mut map = AccountMap::default();
        map.insert(self.key, crema_account(encode(AccountKind::Pool, pool)));
        map.insert(
            self.pool.clmm_config,
            crema_account(encode(AccountKind::Config, &config)),
        );
        map.insert(
            fee_tier_address(&CREMA_PROGRAM_ID, &self.pool.clmm_config, 60).0,
            crema_account(encode(AccountKind::FeeTier, &fee_tier)),
        );
        map.insert(
            self.tick_array_address(CURRENT_ARRAY),
            crema_account(encode(AccountKind::TickArray, &tick_array)),
        );
        map
    }

    fn quote_params(&self, input_mint: Pubkey, swap_mode: SwapMode) -> QuoteParams {
        let output_mint = if input_mint == self.pool.token_a {
            self.pool.token_b
        } else {
            self.pool.token_a
        };
        QuoteParams {
            amount: 1_000_000,
            input_mint,
            output_mint,
            swap_mode,
        }
    }
}

#[test]
fn test_accounts_before_first_update() {
    let market = Market::new();
    let amm = market.load();

    let accounts = amm.get_accounts_to_update();
    assert_eq!(accounts.len(), 8);
    assert_eq!(accounts[0], market.key);
    assert_eq!(accounts[1], market.pool.clmm_config);
    assert_eq!(
        accounts[2],
        fee_tier_address(&CREMA_PROGRAM_ID, &market.pool.clmm_config, 60).0
    );
    assert_eq!(accounts[5], market.tick_array_address(CURRENT_ARRAY));

    assert_eq!(amm.label(), "Crema");
    assert_eq!(amm.program_id(), CREMA_PROGRAM_ID);
    assert_eq!(
        amm.get_reserve_mints(),
        vec![market.pool.token_a, market.pool.token_b]
    );
}

#[test]
fn test_quote_before_update_fails() {
    let market = Market::new();
    let amm = market.load();

    let err = amm
        .quote(&market.quote_params(market.pool.token_a, SwapMode::ExactIn))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<QuoteError>(),
        Some(&QuoteError::NotRefreshed)
    );
}

#[test]
fn test_update_then_quote_exact_in() {
    let market = Market::new();
    let mut amm = market.load();
    amm.update(&market.account_map(&market.pool)).unwrap();

    let accounts = amm.get_accounts_to_update();
    assert_eq!(accounts.len(), 6);
    assert_eq!(accounts[0], market.key);

    let quote = amm
        .quote(&market.quote_params(market.pool.token_a, SwapMode::ExactIn))
        .unwrap();
    assert_eq!(quote.in_amount, 1_000_000);
    assert!(quote.out_amount > 990_000 && quote.out_amount < 997_000);
    assert_eq!(quote.fee_amount, 3_000);
    assert_eq!(quote.fee_mint, market.pool.token_b);
    assert_eq!(quote.fee_pct, Decimal::new(3, 1));
}

#[test]
fn test_update_then_quote_exact_out() {
    let market = Market::new();
    let mut amm = market.load();
    amm.update(&market.account_map(&market.pool)).unwrap();

    let quote = amm
        .quote(&market.quote_params(market.pool.token_b, SwapMode::ExactOut))
        .unwrap();
    assert_eq!(quote.out_amount, 1_000_000);
    assert!(quote.in_amount > 1_000_000);
    assert_eq!(quote.fee_mint, market.pool.token_b);
}

#[test]
fn test_later_updates_follow_the_pool() {
    let market = Market::new();
    let mut amm = market.load();
    amm.update(&market.account_map(&market.pool)).unwrap();

    let mut moved = market.pool.clone();
    moved.current_tick_index = -4000;
    moved.is_pause = true;
    amm.update(&market.account_map(&moved)).unwrap();

    assert_eq!(amm.pool().current_tick_index, -4000);
    assert!(!amm.is_active());
    assert_eq!(
        amm.get_accounts_to_update()[3],
        market.tick_array_address(CURRENT_ARRAY - 1)
    );

    // The array now holding the price was never fetched
    let err = amm
        .quote(&market.quote_params(market.pool.token_a, SwapMode::ExactIn))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<QuoteError>(),
        Some(&QuoteError::InsufficientTickData {
            array_index: Some(CURRENT_ARRAY - 1)
        })
    );
}

#[test]
fn test_update_without_pool_fails() {
    let market = Market::new();
    let mut amm = market.load();
    let mut map = market.account_map(&market.pool);
    map.remove(&market.key);
    assert!(amm.update(&map).is_err());
    assert!(amm.pool_state().is_none());
}

#[test]
fn test_rejects_foreign_accounts() {
    let market = Market::new();
    let context = AmmContext {
        clock_ref: ClockRef::default(),
    };

    let mut foreign = market.keyed_account();
    foreign.account.owner = Pubkey::new_unique();
    assert!(CremaAmm::from_keyed_account(&foreign, &context).is_err());

    let mut no_params = market.keyed_account();
    no_params.params = None;
    assert!(CremaAmm::from_keyed_account(&no_params, &context).is_err());

    let mut not_a_pool = market.keyed_account();
    not_a_pool.account.data = encode(AccountKind::Config, &ClmmConfig::default());
    assert!(CremaAmm::from_keyed_account(&not_a_pool, &context).is_err());
}

#[test]
fn test_router_capabilities() {
    let market = Market::new();
    let amm = market.load();
    assert!(amm.supports_exact_out());
    assert!(amm.is_active());
    assert!(amm.clone_amm().key() == market.key);
}
