use std::fmt;
use std::str::FromStr;

use crate::error::PluginError;
use crate::value::Value;

/// Name of the distinguished identifier field inside a record.
pub const ID_FIELD: &str = "_id";

/// Time-derived record identifier.
///
/// Layout (12 bytes):
/// - `[0..4]`:  creation time, whole seconds since the Unix epoch, big-endian
/// - `[4..12]`: uniqueness component
///
/// Byte-wise ordering equals creation order at second granularity, so the
/// derived `Ord` is the store's ascending identifier order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; 12]);

impl RecordId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Smallest identifier that could have been created at `secs`.
    pub fn floor_for_timestamp(secs: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        Self(bytes)
    }

    /// Identifier with the given timestamp and uniqueness component.
    pub fn new(secs: u32, unique: u64) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&unique.to_be_bytes());
        Self(bytes)
    }

    /// Creation time in whole seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Canonical string form: 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(24);
        for b in self.0 {
            out.push(char::from_digit(u32::from(b >> 4), 16).unwrap_or('0'));
            out.push(char::from_digit(u32::from(b & 0x0f), 16).unwrap_or('0'));
        }
        out
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.is_ascii() {
            return Err(PluginError::format_err(format!("record id must be 24 hex chars: {s:?}")));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| PluginError::format_err(format!("record id is not hex: {s:?}")))?;
        }
        Ok(Self(bytes))
    }
}

/// A read-only snapshot of one stored document.
///
/// `fields` keeps the document's own key order, including the `_id` field
/// (as `Value::Id`) wherever the store placed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    /// Build a record whose first field is `_id`, followed by `fields`.
    pub fn with_fields(id: RecordId, fields: Vec<(String, Value)>) -> Self {
        let mut all = Vec::with_capacity(fields.len() + 1);
        all.push((ID_FIELD.to_string(), Value::Id(id)));
        all.extend(fields);
        Self { id, fields: all }
    }
}
