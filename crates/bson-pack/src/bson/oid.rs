//! BSON ObjectId.
//!
//! 12 bytes: a 4-byte big-endian UNIX timestamp in seconds, a 5-byte value
//! unique to the process, and a 3-byte big-endian counter.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::counter::AtomicCounter;

/// Raised by [`BsonObjectId::parse_str`] for anything but 24 hex digits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid ObjectId hex string: {0:?}")]
pub struct ObjectIdError(pub String);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BsonObjectId {
    bytes: [u8; 12],
}

fn process_unique() -> [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    *PROCESS_UNIQUE.get_or_init(rand::random)
}

fn oid_counter() -> &'static AtomicCounter {
    static COUNTER: OnceLock<AtomicCounter> = OnceLock::new();
    COUNTER.get_or_init(|| AtomicCounter::new(rand::random::<u32>() & 0x00ff_ffff))
}

impl BsonObjectId {
    /// Generates a fresh id from the clock, the process value and the shared counter.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let counter = oid_counter().get_and_increment();
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&process_unique());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self { bytes }
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { bytes }
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Seconds since the UNIX epoch at generation time.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// Lowercase 24-digit hex.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(24);
        for byte in self.bytes {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    /// Accepts exactly 24 hex digits of either case.
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ObjectIdError(s.to_owned()));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ObjectIdError(s.to_owned()))?;
        }
        Ok(Self { bytes })
    }
}

impl Default for BsonObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for BsonObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for BsonObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BsonObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}
