use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::{
    constants::{REWARDER_NUM, TICK_ARRAY_SIZE},
    decoder::{AccountRecord, FieldReader},
    errors::{DecodeError, DecodeResult, PriceResult},
    math::tick_math::{tick_array_spacing, tick_array_start_index},
    schema::AccountKind,
};

/// One tick slot; only initialized ticks carry liquidity
#[derive(BorshSerialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub is_initialized: bool,
    pub index: i32,
    /// Q64.64 sqrt price at this tick
    pub sqrt_price: u128,
    /// Liquidity added when crossing upward
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub reward_growth_outside: [u128; REWARDER_NUM],
}

impl Tick {
    fn read(reader: &mut FieldReader) -> DecodeResult<Self> {
        Ok(Self {
            is_initialized: reader.bool()?,
            index: reader.i32()?,
            sqrt_price: reader.u128()?,
            liquidity_net: reader.i128()?,
            liquidity_gross: reader.u128()?,
            fee_growth_outside_a: reader.u128()?,
            fee_growth_outside_b: reader.u128()?,
            reward_growth_outside: reader.u128_array()?,
        })
    }
}

/// 64 consecutive tick slots of one pool
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArray {
    pub array_index: u16,
    pub tick_spacing: u16,
    pub clmmpool: Pubkey,
    pub ticks: [Tick; TICK_ARRAY_SIZE],
}

impl Default for TickArray {
    fn default() -> Self {
        Self {
            array_index: 0,
            tick_spacing: 0,
            clmmpool: Pubkey::default(),
            ticks: [Tick::default(); TICK_ARRAY_SIZE],
        }
    }
}

impl TickArray {
    pub fn start_tick_index(&self) -> PriceResult<i32> {
        tick_array_start_index(self.array_index as i32, self.tick_spacing)
    }

    /// Last tick slot covered by this array
    pub fn end_tick_index(&self) -> PriceResult<i32> {
        Ok(self.start_tick_index()? + tick_array_spacing(self.tick_spacing)?
            - self.tick_spacing as i32)
    }

    pub fn contains(&self, tick_index: i32) -> PriceResult<bool> {
        Ok(self.start_tick_index()? <= tick_index && tick_index <= self.end_tick_index()?)
    }

    pub fn initialized_ticks(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.iter().filter(|tick| tick.is_initialized)
    }
}

impl AccountRecord for TickArray {
    const KIND: AccountKind = AccountKind::TickArray;

    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self> {
        let array_index = reader.u16()?;
        let tick_spacing = reader.u16()?;
        if tick_spacing == 0 {
            return Err(DecodeError::malformed(
                Self::KIND,
                "tick_spacing",
                "tick spacing must be nonzero",
            ));
        }
        let clmmpool = reader.pubkey()?;
        let ticks = reader.structs(Tick::read)?;
        let ticks = ticks.try_into().map_err(|_| {
            DecodeError::malformed(Self::KIND, "ticks", "expected 64 ticks")
        })?;

        Ok(Self {
            array_index,
            tick_spacing,
            clmmpool,
            ticks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_with(initialized: &[usize]) -> TickArray {
        let mut array = TickArray {
            array_index: 115,
            tick_spacing: 60,
            ..Default::default()
        };
        let start = array.start_tick_index().unwrap();
        for (i, tick) in array.ticks.iter_mut().enumerate() {
            tick.index = start + i as i32 * 60;
            tick.is_initialized = initialized.contains(&i);
        }
        array
    }

    #[test]
    fn test_bounds() {
        let array = array_with(&[]);
        let start = array.start_tick_index().unwrap();
        assert_eq!(start, -443_580 + 115 * 3840);
        assert_eq!(array.end_tick_index().unwrap(), start + 63 * 60);
        assert!(array.contains(0).unwrap());
        assert!(!array.contains(start - 1).unwrap());
    }

    #[test]
    fn test_initialized_ticks() {
        let array = array_with(&[2, 10]);
        let start = array.start_tick_index().unwrap();
        let indexes: Vec<i32> = array.initialized_ticks().map(|tick| tick.index).collect();
        assert_eq!(indexes, vec![start + 120, start + 600]);
    }
}
