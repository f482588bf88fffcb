//! # Binary Record Decoder
//!
//! Turns raw account bytes into typed records by walking the field tables
//! of [`crate::schema`]. Decoding happens in two passes:
//!
//! 1. The schema walk produces an ordered [`Value`] tree, checking the
//!    discriminator, every field boundary, booleans and option tags.
//! 2. A [`FieldReader`] hands those values to the record's
//!    [`AccountRecord::from_fields`] in declaration order.
//!
//! The walk never reads past the end of the input and never panics.

use solana_program::pubkey::Pubkey;

use crate::{
    constants::DISCRIMINATOR_LEN,
    errors::{DecodeError, DecodeResult},
    schema::{AccountKind, Field, FieldType},
    state::{
        ClmmConfig, Clmmpool, FeeTier, Mint, Partner, Position, Rewarder, TickArray, TokenAccount,
    },
};

/// Untyped decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Bool(bool),
    Pubkey(Pubkey),
    Bytes(Vec<u8>),
    String(String),
    /// Both `Option` and `COption` decode to this
    Option(Option<Box<Value>>),
    Array(Vec<Value>),
    Struct(Vec<Value>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::Bool(_) => "bool",
            Value::Pubkey(_) => "pubkey",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Option(_) => "option",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }
}

// =============================================================================
// SCHEMA WALK
// =============================================================================

struct Cursor<'a> {
    kind: AccountKind,
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(kind: AccountKind, data: &'a [u8]) -> Self {
        Self {
            kind,
            data,
            offset: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn take(&mut self, len: usize, field: &'static str) -> DecodeResult<&'a [u8]> {
        let available = self.remaining();
        if available < len {
            return Err(DecodeError::TruncatedInput {
                kind: self.kind,
                field,
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }
}

fn decode_value(ty: &FieldType, field: &'static str, cursor: &mut Cursor) -> DecodeResult<Value> {
    let value = match ty {
        FieldType::U8 => Value::U8(u8::from_le_bytes(cursor.take_array(field)?)),
        FieldType::U16 => Value::U16(u16::from_le_bytes(cursor.take_array(field)?)),
        FieldType::U32 => Value::U32(u32::from_le_bytes(cursor.take_array(field)?)),
        FieldType::U64 => Value::U64(u64::from_le_bytes(cursor.take_array(field)?)),
        FieldType::U128 => Value::U128(u128::from_le_bytes(cursor.take_array(field)?)),
        FieldType::I8 => Value::I8(i8::from_le_bytes(cursor.take_array(field)?)),
        FieldType::I16 => Value::I16(i16::from_le_bytes(cursor.take_array(field)?)),
        FieldType::I32 => Value::I32(i32::from_le_bytes(cursor.take_array(field)?)),
        FieldType::I64 => Value::I64(i64::from_le_bytes(cursor.take_array(field)?)),
        FieldType::I128 => Value::I128(i128::from_le_bytes(cursor.take_array(field)?)),
        FieldType::Bool => match cursor.take_array::<1>(field)?[0] {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => {
                return Err(DecodeError::malformed(
                    cursor.kind,
                    field,
                    format!("invalid bool byte {}", other),
                ))
            }
        },
        FieldType::Pubkey => Value::Pubkey(Pubkey::new_from_array(cursor.take_array(field)?)),
        FieldType::Bytes(len) => Value::Bytes(cursor.take(*len, field)?.to_vec()),
        FieldType::String => {
            let len = u32::from_le_bytes(cursor.take_array(field)?) as usize;
            let bytes = cursor.take(len, field)?;
            let text = std::str::from_utf8(bytes).map_err(|e| {
                DecodeError::malformed(cursor.kind, field, format!("invalid utf-8: {}", e))
            })?;
            Value::String(text.to_string())
        }
        FieldType::Option(inner) => match cursor.take_array::<1>(field)?[0] {
            0 => Value::Option(None),
            1 => Value::Option(Some(Box::new(decode_value(inner, field, cursor)?))),
            other => {
                return Err(DecodeError::malformed(
                    cursor.kind,
                    field,
                    format!("invalid option tag {}", other),
                ))
            }
        },
        FieldType::COption(inner) => {
            let tag = u32::from_le_bytes(cursor.take_array(field)?);
            // Payload is always present on the wire, even when the tag says None
            let payload = decode_value(inner, field, cursor)?;
            match tag {
                0 => Value::Option(None),
                1 => Value::Option(Some(Box::new(payload))),
                other => {
                    return Err(DecodeError::malformed(
                        cursor.kind,
                        field,
                        format!("invalid coption tag {}", other),
                    ))
                }
            }
        }
        FieldType::Array(inner, len) => {
            let mut items = Vec::with_capacity(*len);
            for _ in 0..*len {
                items.push(decode_value(inner, field, cursor)?);
            }
            Value::Array(items)
        }
        FieldType::Struct(fields) => Value::Struct(decode_fields(fields, cursor)?),
    };
    Ok(value)
}

fn decode_fields(fields: &'static [Field], cursor: &mut Cursor) -> DecodeResult<Vec<Value>> {
    fields
        .iter()
        .map(|field| decode_value(&field.ty, field.name, cursor))
        .collect()
}

/// Decode the account body of `kind` into values in schema order
///
/// Anchor kinds must start with their discriminator and may carry trailing
/// padding. SPL kinds must match their packed length exactly.
pub fn decode_values(kind: AccountKind, data: &[u8]) -> DecodeResult<Vec<Value>> {
    let schema = kind.schema();

    let body = match kind.discriminator() {
        Some(expected_tag) => {
            if data.len() < DISCRIMINATOR_LEN {
                return Err(DecodeError::TruncatedInput {
                    kind,
                    field: "discriminator",
                    needed: DISCRIMINATOR_LEN,
                    available: data.len(),
                });
            }
            let mut found = [0u8; DISCRIMINATOR_LEN];
            found.copy_from_slice(&data[..DISCRIMINATOR_LEN]);
            if found != expected_tag {
                return Err(DecodeError::WrongAccountKind {
                    expected: kind,
                    expected_tag,
                    found,
                });
            }
            let body = &data[DISCRIMINATOR_LEN..];
            if body.len() < schema.min_size() {
                return Err(DecodeError::TruncatedInput {
                    kind,
                    field: "account body",
                    needed: schema.min_account_size(),
                    available: data.len(),
                });
            }
            body
        }
        None => {
            if data.len() != schema.min_size() {
                return Err(DecodeError::InvalidLength {
                    kind,
                    expected: schema.min_size(),
                    actual: data.len(),
                });
            }
            data
        }
    };

    let mut cursor = Cursor::new(kind, body);
    decode_fields(schema.fields, &mut cursor)
}

// =============================================================================
// TYPED RECORDS
// =============================================================================

/// A typed record with a schema in the catalog
pub trait AccountRecord: Sized {
    const KIND: AccountKind;

    /// Build the record from values in schema order
    fn from_fields(reader: &mut FieldReader) -> DecodeResult<Self>;
}

/// Sequential reader over decoded values, paired with their field names
pub struct FieldReader {
    kind: AccountKind,
    fields: &'static [Field],
    values: std::vec::IntoIter<Value>,
    position: usize,
}

macro_rules! scalar_readers {
    ($($method:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $method(&mut self) -> DecodeResult<$ty> {
                match self.next_value()? {
                    (_, Value::$variant(v)) => Ok(v),
                    (field, other) => Err(self.mismatch(field, stringify!($method), &other)),
                }
            }
        )*
    };
}

impl FieldReader {
    pub fn new(kind: AccountKind, fields: &'static [Field], values: Vec<Value>) -> Self {
        Self {
            kind,
            fields,
            values: values.into_iter(),
            position: 0,
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    fn current_field(&self) -> DecodeResult<&'static Field> {
        self.fields.get(self.position).ok_or_else(|| {
            DecodeError::malformed(self.kind, "<end>", "record reads past its last field")
        })
    }

    fn next_value(&mut self) -> DecodeResult<(&'static str, Value)> {
        let field = self.current_field()?;
        let value = self.values.next().ok_or_else(|| {
            DecodeError::malformed(self.kind, field.name, "value missing for field")
        })?;
        self.position += 1;
        Ok((field.name, value))
    }

    fn mismatch(&self, field: &'static str, wanted: &str, found: &Value) -> DecodeError {
        DecodeError::malformed(
            self.kind,
            field,
            format!("expected {}, decoded {}", wanted, found.type_name()),
        )
    }

    scalar_readers! {
        u8 => U8: u8,
        u16 => U16: u16,
        u32 => U32: u32,
        u64 => U64: u64,
        u128 => U128: u128,
        i8 => I8: i8,
        i16 => I16: i16,
        i32 => I32: i32,
        i64 => I64: i64,
        i128 => I128: i128,
        bool => Bool: bool,
        pubkey => Pubkey: Pubkey,
        string => String: String,
    }

    pub fn bytes<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        match self.next_value()? {
            (field, Value::Bytes(bytes)) => bytes
                .try_into()
                .map_err(|_| DecodeError::malformed(self.kind, field, "byte width mismatch")),
            (field, other) => Err(self.mismatch(field, "bytes", &other)),
        }
    }

    pub fn option_pubkey(&mut self) -> DecodeResult<Option<Pubkey>> {
        match self.next_value()? {
            (_, Value::Option(None)) => Ok(None),
            (_, Value::Option(Some(inner))) => match *inner {
                Value::Pubkey(key) => Ok(Some(key)),
                other => Err(self.mismatch("option", "pubkey", &other)),
            },
            (field, other) => Err(self.mismatch(field, "option", &other)),
        }
    }

    pub fn option_u64(&mut self) -> DecodeResult<Option<u64>> {
        match self.next_value()? {
            (_, Value::Option(None)) => Ok(None),
            (_, Value::Option(Some(inner))) => match *inner {
                Value::U64(v) => Ok(Some(v)),
                other => Err(self.mismatch("option", "u64", &other)),
            },
            (field, other) => Err(self.mismatch(field, "option", &other)),
        }
    }

    /// Fixed array of u128 values
    pub fn u128_array<const N: usize>(&mut self) -> DecodeResult<[u128; N]> {
        let (field, value) = self.next_value()?;
        let items = match value {
            Value::Array(items) if items.len() == N => items,
            other => return Err(self.mismatch(field, "u128 array", &other)),
        };
        let mut out = [0u128; N];
        for (slot, item) in out.iter_mut().zip(items) {
            match item {
                Value::U128(v) => *slot = v,
                other => return Err(self.mismatch(field, "u128", &other)),
            }
        }
        Ok(out)
    }

    /// Array of nested structs, each read by `read`
    pub fn structs<T>(
        &mut self,
        mut read: impl FnMut(&mut FieldReader) -> DecodeResult<T>,
    ) -> DecodeResult<Vec<T>> {
        let field = self.current_field()?;
        let inner_fields = match field.ty {
            FieldType::Array(FieldType::Struct(inner), _) => *inner,
            _ => {
                return Err(DecodeError::malformed(
                    self.kind,
                    field.name,
                    "field is not an array of structs",
                ))
            }
        };
        let (name, value) = self.next_value()?;
        let items = match value {
            Value::Array(items) => items,
            other => return Err(self.mismatch(name, "array", &other)),
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let values = match item {
                Value::Struct(values) => values,
                other => return Err(self.mismatch(name, "struct", &other)),
            };
            let mut nested = FieldReader::new(self.kind, inner_fields, values);
            out.push(read(&mut nested)?);
            nested.finish()?;
        }
        Ok(out)
    }

    /// Ensure every field was consumed
    pub fn finish(self) -> DecodeResult<()> {
        match self.fields.get(self.position) {
            Some(field) => Err(DecodeError::malformed(
                self.kind,
                field.name,
                "field left unread by record",
            )),
            None => Ok(()),
        }
    }
}

/// Decode `data` as the record type `T`
pub fn decode_as<T: AccountRecord>(data: &[u8]) -> DecodeResult<T> {
    let values = decode_values(T::KIND, data)?;
    let mut reader = FieldReader::new(T::KIND, T::KIND.schema().fields, values);
    let record = T::from_fields(&mut reader)?;
    reader.finish()?;
    Ok(record)
}

/// Any decoded record, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedAccount {
    Config(ClmmConfig),
    FeeTier(FeeTier),
    Pool(Clmmpool),
    TickArray(Box<TickArray>),
    Position(Position),
    Partner(Partner),
    Rewarder(Rewarder),
    TokenAccount(TokenAccount),
    Mint(Mint),
}

impl DecodedAccount {
    pub fn kind(&self) -> AccountKind {
        match self {
            DecodedAccount::Config(_) => AccountKind::Config,
            DecodedAccount::FeeTier(_) => AccountKind::FeeTier,
            DecodedAccount::Pool(_) => AccountKind::Pool,
            DecodedAccount::TickArray(_) => AccountKind::TickArray,
            DecodedAccount::Position(_) => AccountKind::Position,
            DecodedAccount::Partner(_) => AccountKind::Partner,
            DecodedAccount::Rewarder(_) => AccountKind::Rewarder,
            DecodedAccount::TokenAccount(_) => AccountKind::TokenAccount,
            DecodedAccount::Mint(_) => AccountKind::Mint,
        }
    }
}

/// Decode `data` as an account of `kind`
pub fn decode(kind: AccountKind, data: &[u8]) -> DecodeResult<DecodedAccount> {
    let account = match kind {
        AccountKind::Config => DecodedAccount::Config(decode_as(data)?),
        AccountKind::FeeTier => DecodedAccount::FeeTier(decode_as(data)?),
        AccountKind::Pool => DecodedAccount::Pool(decode_as(data)?),
        AccountKind::TickArray => DecodedAccount::TickArray(Box::new(decode_as(data)?)),
        AccountKind::Position => DecodedAccount::Position(decode_as(data)?),
        AccountKind::Partner => DecodedAccount::Partner(decode_as(data)?),
        AccountKind::Rewarder => DecodedAccount::Rewarder(decode_as(data)?),
        AccountKind::TokenAccount => DecodedAccount::TokenAccount(decode_as(data)?),
        AccountKind::Mint => DecodedAccount::Mint(decode_as(data)?),
    };
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    static OPTIONAL_FIELDS: &[Field] = &[
        Field::new("flag", FieldType::Bool),
        Field::new("maybe", FieldType::Option(&FieldType::U32)),
        Field::new("label", FieldType::String),
    ];

    fn walk(fields: &'static [Field], data: &[u8]) -> DecodeResult<Vec<Value>> {
        let mut cursor = Cursor::new(AccountKind::Partner, data);
        decode_fields(fields, &mut cursor)
    }

    fn tagged(kind: AccountKind, body: &[u8]) -> Vec<u8> {
        let mut data = kind.discriminator().unwrap().to_vec();
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_option_present_and_absent() {
        let data = [1u8, 1, 7, 0, 0, 0, 2, 0, 0, 0, b'o', b'k'];
        let values = walk(OPTIONAL_FIELDS, &data).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::Option(Some(Box::new(Value::U32(7)))),
                Value::String("ok".to_string()),
            ]
        );

        let data = [0u8, 0, 0, 0, 0, 0];
        let values = walk(OPTIONAL_FIELDS, &data).unwrap();
        assert_eq!(values[1], Value::Option(None));
        assert_eq!(values[2], Value::String(String::new()));
    }

    #[test]
    fn test_invalid_bool_is_malformed() {
        let data = [2u8, 0, 0, 0, 0, 0];
        let err = walk(OPTIONAL_FIELDS, &data).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { field: "flag", .. }));
    }

    #[test]
    fn test_invalid_option_tag_is_malformed() {
        let data = [0u8, 9, 0, 0, 0, 0];
        let err = walk(OPTIONAL_FIELDS, &data).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { field: "maybe", .. }));
    }

    #[test]
    fn test_string_length_past_end_is_truncated() {
        let data = [0u8, 0, 200, 0, 0, 0, b'x'];
        let err = walk(OPTIONAL_FIELDS, &data).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                kind: AccountKind::Partner,
                field: "label",
                needed: 200,
                available: 1,
            }
        );
    }

    #[test]
    fn test_fee_tier_decodes() {
        let body = [0xb8, 0x0b, 60, 0, 254];
        let values = decode_values(AccountKind::FeeTier, &tagged(AccountKind::FeeTier, &body)).unwrap();
        assert_eq!(values, vec![Value::U16(3000), Value::U16(60), Value::U8(254)]);
    }

    #[test]
    fn test_trailing_padding_is_ignored() {
        let mut body = vec![0xb8, 0x0b, 60, 0, 254];
        body.extend_from_slice(&[0u8; 16]);
        let fee_tier: FeeTier = decode_as(&tagged(AccountKind::FeeTier, &body)).unwrap();
        assert_eq!(fee_tier.tick_spacing, 60);
    }

    #[test]
    fn test_short_input_is_truncated() {
        let err = decode_values(AccountKind::FeeTier, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedInput { field: "discriminator", needed: 8, available: 3, .. }
        ));

        let data = tagged(AccountKind::FeeTier, &[0xb8, 0x0b, 60]);
        let err = decode_values(AccountKind::FeeTier, &data).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedInput { needed: 13, available: 11, .. }
        ));
    }

    #[test]
    fn test_other_kind_of_same_length_is_rejected() {
        let body = [0u8; 5];
        let data = tagged(AccountKind::FeeTier, &body);
        let err = decode(AccountKind::Config, &{
            let mut padded = data.clone();
            padded.resize(8 + 130, 0);
            padded
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::WrongAccountKind { expected: AccountKind::Config, .. }
        ));
    }

    #[test]
    fn test_spl_layout_requires_exact_length() {
        let err = decode(AccountKind::Mint, &[0u8; 81]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidLength {
                kind: AccountKind::Mint,
                expected: 82,
                actual: 81,
            }
        );
    }

    #[test]
    fn test_reader_rejects_type_mismatch() {
        let mut reader = FieldReader::new(
            AccountKind::Partner,
            OPTIONAL_FIELDS,
            vec![Value::U8(1), Value::Option(None), Value::String(String::new())],
        );
        let err = reader.bool().unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { field: "flag", .. }));
    }

    #[test]
    fn test_reader_finish_requires_all_fields() {
        let mut reader = FieldReader::new(
            AccountKind::Partner,
            OPTIONAL_FIELDS,
            vec![Value::Bool(true), Value::Option(None), Value::String(String::new())],
        );
        assert!(reader.bool().unwrap());
        assert!(reader.finish().is_err());
    }
}
