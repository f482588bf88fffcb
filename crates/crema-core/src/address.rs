//! # Address Derivation
//!
//! Program-derived addresses of Crema accounts and the tick-array window a
//! pool needs around its current price.
//!
//! The window covers the array holding the current tick and up to
//! [`TICK_ARRAY_WINDOW_RADIUS`] neighbours on each side. Neighbours outside
//! `0..=max_tick_array_index` do not exist on-chain and are left out.

use std::collections::HashMap;
use std::sync::RwLock;

use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::{
    constants::{seeds, TICK_ARRAY_WINDOW_RADIUS},
    errors::PriceResult,
    math::tick_math::{max_tick_array_index, tick_array_index},
    state::Clmmpool,
};

// ============================================================================
// Seeds
// ============================================================================

pub fn tick_array_address(program_id: &Pubkey, pool: &Pubkey, array_index: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::TICK_ARRAY, pool.as_ref(), &array_index.to_le_bytes()],
        program_id,
    )
}

pub fn fee_tier_address(program_id: &Pubkey, config: &Pubkey, tick_spacing: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::FEE_TIER, config.as_ref(), &tick_spacing.to_le_bytes()],
        program_id,
    )
}

pub fn config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::CLMM_CONFIG], program_id)
}

pub fn tick_array_map_address(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::TICK_ARRAY_MAP, pool.as_ref()], program_id)
}

pub fn partner_address(program_id: &Pubkey, base: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::PARTNER, base.as_ref()], program_id)
}

pub fn position_address(program_id: &Pubkey, position_nft_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::POSITION, position_nft_mint.as_ref()], program_id)
}

// ============================================================================
// Cached builder
// ============================================================================

/// Memoizes derivations; a pool re-derives the same arrays on every refresh
pub struct PdaBuilder {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
    pub program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            program_id,
        }
    }

    fn get_or_compute(&self, key: String, compute: impl FnOnce() -> (Pubkey, u8)) -> (Pubkey, u8) {
        if let Ok(cache) = self.cache.read() {
            if let Some(cached) = cache.get(&key) {
                return *cached;
            }
        }
        let result = compute();
        // A poisoned cache only costs a recomputation next time
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, result);
        }
        result
    }

    pub fn tick_array(&self, pool: &Pubkey, array_index: u16) -> Pubkey {
        let key = format!("tick_array:{}:{}", pool, array_index);
        self.get_or_compute(key, || tick_array_address(&self.program_id, pool, array_index))
            .0
    }

    pub fn fee_tier(&self, config: &Pubkey, tick_spacing: u16) -> Pubkey {
        let key = format!("fee_tier:{}:{}", config, tick_spacing);
        self.get_or_compute(key, || fee_tier_address(&self.program_id, config, tick_spacing))
            .0
    }

    pub fn config(&self) -> Pubkey {
        self.get_or_compute("config".to_string(), || config_address(&self.program_id))
            .0
    }

    pub fn tick_array_map(&self, pool: &Pubkey) -> Pubkey {
        let key = format!("tick_array_map:{}", pool);
        self.get_or_compute(key, || tick_array_map_address(&self.program_id, pool))
            .0
    }
}

impl Clone for PdaBuilder {
    fn clone(&self) -> Self {
        let cache = self
            .cache
            .read()
            .map(|cache| cache.clone())
            .unwrap_or_default();
        Self {
            cache: RwLock::new(cache),
            program_id: self.program_id,
        }
    }
}

// ============================================================================
// Tick array window
// ============================================================================

/// In-range tick arrays around a pool's current tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickArrayWindow {
    /// Array holding the current tick, when it is in range
    pub current_array_index: Option<u16>,
    /// `(array_index, address)` in ascending offset order
    pub entries: Vec<(u16, Pubkey)>,
}

impl TickArrayWindow {
    /// Window of `radius` arrays on each side of the current one
    pub fn around(
        pdas: &PdaBuilder,
        pool_address: &Pubkey,
        pool: &Clmmpool,
        radius: i32,
    ) -> PriceResult<Self> {
        let current = tick_array_index(pool.current_tick_index, pool.tick_spacing)?;
        let max_index = max_tick_array_index(pool.tick_spacing)?;

        let entries = (-radius..=radius)
            .map(|offset| current + offset)
            .filter(|index| (0..=max_index).contains(index))
            .filter_map(|index| u16::try_from(index).ok())
            .map(|index| (index, pdas.tick_array(pool_address, index)))
            .collect();
        let current_array_index = (0..=max_index)
            .contains(&current)
            .then_some(current)
            .and_then(|index| u16::try_from(index).ok());

        Ok(Self {
            current_array_index,
            entries,
        })
    }

    /// Standard window of [`TICK_ARRAY_WINDOW_RADIUS`] neighbours
    ///
    /// A pool with zero tick spacing has no arrays.
    pub fn for_pool(pdas: &PdaBuilder, pool_address: &Pubkey, pool: &Clmmpool) -> Self {
        match Self::around(pdas, pool_address, pool, TICK_ARRAY_WINDOW_RADIUS) {
            Ok(window) => window,
            Err(err) => {
                debug!(pool = %pool_address, %err, "No tick array window for pool");
                Self::default()
            }
        }
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Pubkey> + '_ {
        self.entries.iter().map(|(_, address)| address)
    }

    pub fn current_address(&self) -> Option<&Pubkey> {
        let current = self.current_array_index?;
        self.entries
            .iter()
            .find(|(index, _)| *index == current)
            .map(|(_, address)| address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pool address followed by its tick-array window
pub fn relevant_addresses(pdas: &PdaBuilder, pool_address: &Pubkey, pool: &Clmmpool) -> Vec<Pubkey> {
    let window = TickArrayWindow::for_pool(pdas, pool_address, pool);
    std::iter::once(*pool_address)
        .chain(window.addresses().copied())
        .collect()
}
