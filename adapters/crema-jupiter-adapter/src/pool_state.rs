//! # Pool State
//!
//! In-memory mirror of one Crema pool: its config, fee tier, pool record
//! and the tick arrays loaded around the current price.
//!
//! The pool record and tick arrays live in one immutable [`PoolSnapshot`].
//! A refresh decodes everything it needs into a new snapshot and only then
//! installs it with a single pointer swap, so readers see either the old
//! snapshot or the new one, never a mix.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use crema_core::{
    decode_as, relevant_addresses, AccountKind, ClmmConfig, Clmmpool, FeeTier, PdaBuilder,
    TickArray, TickArrayWindow, CREMA_PROGRAM_ID,
};
use solana_program::pubkey::Pubkey;
use solana_sdk::account::Account;
use tracing::{debug, warn};

use crate::error::{RefreshError, RefreshResult};

// =============================================================================
// ACCOUNT SOURCES
// =============================================================================

/// Batch of fetched account bytes keyed by address
pub trait AccountSource {
    /// Bytes of `address`, or `None` when it was not fetched or has no
    /// on-chain account
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]>;
}

impl<S: BuildHasher> AccountSource for HashMap<Pubkey, Option<Vec<u8>>, S> {
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.get(address).and_then(|data| data.as_deref())
    }
}

impl<S: BuildHasher> AccountSource for HashMap<Pubkey, Vec<u8>, S> {
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.get(address).map(Vec::as_slice)
    }
}

/// Covers the router's `AccountMap`
impl<S: BuildHasher> AccountSource for HashMap<Pubkey, Account, S> {
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.get(address).map(|account| account.data.as_slice())
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Raw bytes decoded once when a pool state is built
#[derive(Debug, Clone, Copy)]
pub struct PoolAccounts<'a> {
    pub pool: &'a [u8],
    pub config: &'a [u8],
    pub fee_tier: &'a [u8],
}

/// Mint decimals of the pair, in pool orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenDecimals {
    pub decimals_a: u8,
    pub decimals_b: u8,
}

/// Tick array together with the address it was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTickArray {
    pub address: Pubkey,
    pub tick_array: TickArray,
}

/// Pool record plus the tick arrays loaded alongside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub pool: Clmmpool,
    /// Ascending array index order
    tick_arrays: Vec<LoadedTickArray>,
    /// array_index -> position in `tick_arrays`
    by_index: AHashMap<u16, usize>,
}

impl PoolSnapshot {
    pub fn new(pool: Clmmpool, mut tick_arrays: Vec<LoadedTickArray>) -> Self {
        tick_arrays.sort_by_key(|loaded| loaded.tick_array.array_index);
        tick_arrays.dedup_by_key(|loaded| loaded.tick_array.array_index);
        let by_index = tick_arrays
            .iter()
            .enumerate()
            .map(|(position, loaded)| (loaded.tick_array.array_index, position))
            .collect();
        Self {
            pool,
            tick_arrays,
            by_index,
        }
    }

    pub fn tick_arrays(&self) -> &[LoadedTickArray] {
        &self.tick_arrays
    }

    pub fn tick_array(&self, array_index: u16) -> Option<&TickArray> {
        let position = *self.by_index.get(&array_index)?;
        self.tick_arrays.get(position).map(|loaded| &loaded.tick_array)
    }
}

pub struct PoolState {
    address: Pubkey,
    config: ClmmConfig,
    fee_tier: FeeTier,
    decimals: TokenDecimals,
    pdas: PdaBuilder,
    snapshot: RwLock<Arc<PoolSnapshot>>,
}

impl PoolState {
    /// Build the state of a pool owned by the mainnet Crema program
    pub fn new(
        address: Pubkey,
        accounts: PoolAccounts<'_>,
        decimals: TokenDecimals,
    ) -> RefreshResult<Self> {
        Self::with_program_id(CREMA_PROGRAM_ID, address, accounts, decimals)
    }

    pub fn with_program_id(
        program_id: Pubkey,
        address: Pubkey,
        accounts: PoolAccounts<'_>,
        decimals: TokenDecimals,
    ) -> RefreshResult<Self> {
        let pool: Clmmpool = decode_as(accounts.pool).map_err(|source| {
            RefreshError::PoolDecodeFailed {
                kind: AccountKind::Pool,
                source,
            }
        })?;
        let config: ClmmConfig = decode_as(accounts.config).map_err(|source| {
            RefreshError::PoolDecodeFailed {
                kind: AccountKind::Config,
                source,
            }
        })?;
        let fee_tier: FeeTier = decode_as(accounts.fee_tier).map_err(|source| {
            RefreshError::PoolDecodeFailed {
                kind: AccountKind::FeeTier,
                source,
            }
        })?;

        debug!(
            pool = %address,
            tick_spacing = pool.tick_spacing,
            fee_rate = pool.fee_rate,
            "Pool state initialized"
        );

        Ok(Self {
            address,
            config,
            fee_tier,
            decimals,
            pdas: PdaBuilder::new(program_id),
            snapshot: RwLock::new(Arc::new(PoolSnapshot::new(pool, Vec::new()))),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn program_id(&self) -> Pubkey {
        self.pdas.program_id
    }

    pub fn config(&self) -> &ClmmConfig {
        &self.config
    }

    pub fn fee_tier(&self) -> &FeeTier {
        &self.fee_tier
    }

    pub fn decimals(&self) -> TokenDecimals {
        self.decimals
    }

    pub fn pdas(&self) -> &PdaBuilder {
        &self.pdas
    }

    /// Current snapshot; stays valid while later refreshes install new ones
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        match self.snapshot.read() {
            Ok(snapshot) => Arc::clone(&snapshot),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Tick-array window around the current pool price
    pub fn tick_array_window(&self) -> TickArrayWindow {
        TickArrayWindow::for_pool(&self.pdas, &self.address, &self.snapshot().pool)
    }

    /// Pool address followed by the in-range tick arrays around its price
    pub fn addresses_needing_refresh(&self) -> Vec<Pubkey> {
        relevant_addresses(&self.pdas, &self.address, &self.snapshot().pool)
    }

    /// Rebuild the snapshot from freshly fetched bytes
    ///
    /// The pool record is re-decoded from its own bytes. Tick arrays are
    /// looked up at the window computed before this call; arrays without an
    /// on-chain account are left out. Any failure keeps the previous
    /// snapshot.
    pub fn refresh(&self, accounts: &impl AccountSource) -> RefreshResult<()> {
        let previous = self.snapshot();

        let pool_data = accounts
            .account_data(&self.address)
            .ok_or(RefreshError::MissingRequiredAccount(self.address))?;
        let pool: Clmmpool = decode_as(pool_data).map_err(|source| {
            warn!(pool = %self.address, %source, "Pool account failed to decode");
            RefreshError::PoolDecodeFailed {
                kind: AccountKind::Pool,
                source,
            }
        })?;

        let window = TickArrayWindow::for_pool(&self.pdas, &self.address, &previous.pool);
        let mut tick_arrays = Vec::with_capacity(window.len());
        let mut omitted = 0usize;
        for (array_index, address) in &window.entries {
            let Some(data) = accounts.account_data(address) else {
                omitted += 1;
                continue;
            };
            let tick_array: TickArray = decode_as(data).map_err(|source| {
                warn!(pool = %self.address, tick_array = %address, array_index, %source, "Tick array failed to decode");
                RefreshError::TickArrayDecodeFailed {
                    address: *address,
                    source,
                }
            })?;
            tick_arrays.push(LoadedTickArray {
                address: *address,
                tick_array,
            });
        }

        debug!(
            pool = %self.address,
            loaded = tick_arrays.len(),
            omitted,
            current_tick = pool.current_tick_index,
            "Pool state refreshed"
        );

        let next = Arc::new(PoolSnapshot::new(pool, tick_arrays));
        match self.snapshot.write() {
            Ok(mut snapshot) => *snapshot = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(())
    }
}

impl Clone for PoolState {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            config: self.config.clone(),
            fee_tier: self.fee_tier.clone(),
            decimals: self.decimals,
            pdas: self.pdas.clone(),
            snapshot: RwLock::new(self.snapshot()),
        }
    }
}

impl std::fmt::Debug for PoolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolState")
            .field("address", &self.address)
            .field("decimals", &self.decimals)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
