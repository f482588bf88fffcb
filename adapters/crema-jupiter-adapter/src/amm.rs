//! Jupiter AMM adapter for Crema concentrated-liquidity pools
//!
//! Lets Jupiter's routing engine discover and quote Crema pools:
//!
//! - Decodes the pool from the keyed account handed over by the router
//! - Requests the pool, its config, its fee tier and the tick-array window
//! - Builds a [`PoolState`] on the first update and refreshes it afterwards
//! - Quotes through the [`QuoteAssembler`]
//!
//! Swap instructions are built by the execution layer, not here.

use anyhow::{anyhow, bail, ensure, Context, Result};
use crema_core::{
    decode_as, Clmmpool, PdaBuilder, TickArrayWindow, CREMA_LABEL, CREMA_PROGRAM_ID,
    FEE_RATE_DENOMINATOR,
};
use jupiter_amm_interface::{
    try_get_account_data, AccountMap, Amm, AmmContext, AmmLabel, AmmProgramIdToLabel,
    KeyedAccount, Quote, QuoteParams, SwapAndAccountMetas, SwapParams,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::config::{adapter_config, TickWindow};
use crate::error::QuoteError;
use crate::pool_state::{PoolAccounts, PoolState, TokenDecimals};
use crate::quote::{QuoteAssembler, QuoteRequest};

// =============================================================================
// DATA STRUCTURES & TYPES
// =============================================================================

/// Per-pool parameters supplied in `KeyedAccount::params`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CremaPoolParams {
    pub decimal_a: u8,
    pub decimal_b: u8,
}

impl From<CremaPoolParams> for TokenDecimals {
    fn from(params: CremaPoolParams) -> Self {
        TokenDecimals {
            decimals_a: params.decimal_a,
            decimals_b: params.decimal_b,
        }
    }
}

/// Jupiter AMM adapter for one Crema pool
pub struct CremaAmm {
    /// Pool account public key
    key: Pubkey,
    /// Crema program the pool belongs to
    program_id: Pubkey,
    label: String,
    /// Latest decoded pool record
    pool: Clmmpool,
    decimals: TokenDecimals,
    config_address: Pubkey,
    fee_tier_address: Pubkey,
    pdas: PdaBuilder,
    simulation_window: TickWindow,
    /// Built by the first `update`
    state: Option<PoolState>,
}

impl CremaAmm {
    pub fn pool(&self) -> &Clmmpool {
        &self.pool
    }

    pub fn pool_state(&self) -> Option<&PoolState> {
        self.state.as_ref()
    }

    pub fn config_address(&self) -> Pubkey {
        self.config_address
    }

    pub fn fee_tier_address(&self) -> Pubkey {
        self.fee_tier_address
    }
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

impl AmmProgramIdToLabel for CremaAmm {
    const PROGRAM_ID_TO_LABELS: &'static [(Pubkey, AmmLabel)] = &[(CREMA_PROGRAM_ID, CREMA_LABEL)];
}

impl Clone for CremaAmm {
    fn clone(&self) -> Self {
        CremaAmm {
            key: self.key,
            program_id: self.program_id,
            label: self.label.clone(),
            pool: self.pool.clone(),
            decimals: self.decimals,
            config_address: self.config_address,
            fee_tier_address: self.fee_tier_address,
            pdas: self.pdas.clone(),
            simulation_window: self.simulation_window,
            state: self.state.clone(),
        }
    }
}

// =============================================================================
// JUPITER AMM INTERFACE IMPLEMENTATION
// =============================================================================

impl Amm for CremaAmm {
    /// Initialize from the pool account and its decimal params
    fn from_keyed_account(keyed_account: &KeyedAccount, _amm_context: &AmmContext) -> Result<Self> {
        let config = adapter_config();
        let program_id = config.program_id()?;

        ensure!(
            keyed_account.account.owner == program_id,
            "Account {} is not owned by the Crema program",
            keyed_account.key
        );

        let pool: Clmmpool = decode_as(&keyed_account.account.data)
            .with_context(|| format!("Failed to decode Crema pool {}", keyed_account.key))?;

        let params = keyed_account
            .params
            .clone()
            .ok_or_else(|| anyhow!("Crema pool {} has no decimal params", keyed_account.key))?;
        let params: CremaPoolParams =
            serde_json::from_value(params).context("Invalid Crema pool params")?;

        let pdas = PdaBuilder::new(program_id);
        let config_address = pool.clmm_config;
        let fee_tier_address = pdas.fee_tier(&config_address, pool.tick_spacing);

        debug!(
            pool = %keyed_account.key,
            token_a = %pool.token_a,
            token_b = %pool.token_b,
            tick_spacing = pool.tick_spacing,
            "Crema pool loaded"
        );

        Ok(Self {
            key: keyed_account.key,
            program_id,
            label: config.label,
            pool,
            decimals: params.into(),
            config_address,
            fee_tier_address,
            pdas,
            simulation_window: config.simulation_window,
            state: None,
        })
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn key(&self) -> Pubkey {
        self.key
    }

    fn get_reserve_mints(&self) -> Vec<Pubkey> {
        self.pool.reserve_mints().to_vec()
    }

    /// Accounts Jupiter should fetch before the next `update`
    ///
    /// The first update also needs the config and fee tier; afterwards only
    /// the pool and its tick-array window change.
    fn get_accounts_to_update(&self) -> Vec<Pubkey> {
        match &self.state {
            Some(state) => state.addresses_needing_refresh(),
            None => {
                let window = TickArrayWindow::for_pool(&self.pdas, &self.key, &self.pool);
                let mut accounts = vec![self.key, self.config_address, self.fee_tier_address];
                accounts.extend(window.addresses().copied());
                accounts
            }
        }
    }

    /// Refresh pool state from fetched accounts
    fn update(&mut self, account_map: &AccountMap) -> Result<()> {
        if let Some(state) = &self.state {
            state.refresh(account_map)?;
            self.pool = state.snapshot().pool.clone();
            return Ok(());
        }

        let accounts = PoolAccounts {
            pool: try_get_account_data(account_map, &self.key)?,
            config: try_get_account_data(account_map, &self.config_address)?,
            fee_tier: try_get_account_data(account_map, &self.fee_tier_address)?,
        };
        let state = PoolState::with_program_id(self.program_id, self.key, accounts, self.decimals)?;
        state.refresh(account_map)?;

        self.pool = state.snapshot().pool.clone();
        self.state = Some(state);
        Ok(())
    }

    /// Quote a swap through the pool
    ///
    /// Fails when the pool cannot fill the full amount, since the router
    /// has no field for partial fills.
    fn quote(&self, quote_params: &QuoteParams) -> Result<Quote> {
        let state = self.state.as_ref().ok_or(QuoteError::NotRefreshed)?;
        let request = QuoteRequest {
            source_mint: quote_params.input_mint,
            destination_mint: quote_params.output_mint,
            amount: quote_params.amount,
            swap_mode: quote_params.swap_mode.into(),
        };

        let quote = QuoteAssembler::new()
            .with_window(self.simulation_window)
            .quote(state, &request)?;
        ensure!(
            !quote.not_enough_liquidity,
            "Not enough liquidity in Crema pool {}",
            self.key
        );

        let fee_amount = u64::try_from(quote.fee_amount / FEE_RATE_DENOMINATOR as u128)?;
        // Fee rate is in millionths, so four decimal places give a percent
        let fee_pct = Decimal::new(quote.fee_rate as i64, 4);

        Ok(Quote {
            in_amount: quote.in_amount,
            out_amount: quote.out_amount,
            fee_amount,
            fee_mint: quote.fee_mint,
            fee_pct,
        })
    }

    fn get_swap_and_account_metas(&self, _swap_params: &SwapParams) -> Result<SwapAndAccountMetas> {
        bail!("Crema swap instructions are not built by the quote adapter")
    }

    fn clone_amm(&self) -> Box<dyn Amm + Send + Sync> {
        Box::new(self.clone())
    }

    /// The tick-array window follows the pool price
    fn has_dynamic_accounts(&self) -> bool {
        true
    }

    fn supports_exact_out(&self) -> bool {
        true
    }

    /// Paused pools stay listed but are not routed through
    fn is_active(&self) -> bool {
        !self.pool.is_pause
    }
}
