//! # Core Error Types
//!
//! Errors raised while decoding account bytes and converting prices.
//! Every variant is recoverable; callers decide whether to retry or skip.

use thiserror::Error;

use crate::schema::AccountKind;

/// Failure to turn raw account bytes into a typed record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated {kind} data at field `{field}`: needed {needed} bytes, {available} available")]
    TruncatedInput {
        kind: AccountKind,
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Wrong account kind: expected {expected} discriminator {expected_tag:?}, found {found:?}")]
    WrongAccountKind {
        expected: AccountKind,
        expected_tag: [u8; 8],
        found: [u8; 8],
    },

    #[error("Malformed {kind} field `{field}`: {reason}")]
    MalformedField {
        kind: AccountKind,
        field: &'static str,
        reason: String,
    },

    #[error("Unexpected {kind} length: expected {expected} bytes, found {actual}")]
    InvalidLength {
        kind: AccountKind,
        expected: usize,
        actual: usize,
    },
}

impl DecodeError {
    pub(crate) fn malformed(kind: AccountKind, field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            kind,
            field,
            reason: reason.into(),
        }
    }
}

/// Failure of a tick or price conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("Sqrt price {0} does not fit the decimal range")]
    SqrtPriceOutOfRange(u128),

    #[error("Decimal difference {0} is too large to scale")]
    DecimalsOutOfRange(i32),

    #[error("Price overflow")]
    Overflow,

    #[error("Invalid tick spacing: {0}")]
    InvalidTickSpacing(u16),
}

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type PriceResult<T> = Result<T, PriceError>;
