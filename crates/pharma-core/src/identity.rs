//! # Identity Newtypes
//!
//! Newtype wrappers for every identifier that crosses the ledger or content
//! store boundary. These prevent accidental identifier confusion: a
//! `ContentId` returned by the store cannot be passed where a `MedicineId`
//! is expected.
//!
//! All validated newtypes deserialize through their constructor
//! (`serde(try_from = "String")`), so a malformed value in a config file or
//! a ledger response is rejected at the edge rather than carried inward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An externally owned account on the ledger.
///
/// Accepts `0x` followed by 1 to 40 hex digits. Short forms are left-padded
/// when ABI-encoded; the canonical text form is lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The all-zero address. Never a valid contract binding target.
    pub const ZERO_HEX: &'static str = "0x0000000000000000000000000000000000000000";

    /// Parse and normalize an account address.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(s.to_string()))?;
        if digits.is_empty() || digits.len() > 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(s.to_string()));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// A full-width address from its 20 bytes.
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        let digits: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("0x{digits}"))
    }

    /// The address as `0x`-prefixed lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }

    /// Whether every digit is zero.
    pub fn is_zero(&self) -> bool {
        self.hex_digits().chars().all(|c| c == '0')
    }
}

/// Network identifier reported by the wallet (`net_version`).
///
/// Contract deployment tables are keyed by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parse from a decimal string (`"5777"`) or a hex quantity (`"0x1691"`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(Self)
            .map_err(|_| CoreError::InvalidChainId(s.to_string()))
    }
}

/// Ledger identifier of a medicine record.
///
/// The ledger counts records from 1 as `uint256`; this type keeps the
/// decimal text and never does arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MedicineId(String);

impl MedicineId {
    /// Parse a decimal record identifier, stripping redundant leading zeros.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::InvalidMedicineId(s.to_string()));
        }
        let stripped = trimmed.trim_start_matches('0');
        Ok(Self(if stripped.is_empty() { "0".to_string() } else { stripped.to_string() }))
    }

    /// Build from a small integer (catalogue iteration).
    pub fn from_u64(n: u64) -> Self {
        Self(n.to_string())
    }

    /// Decimal text of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque handle returned by the content-addressed store.
///
/// Treated as immutable and never parsed; the only check is non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a store-issued identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyContentId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash of a submitted ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parse a `0x`-prefixed hex transaction hash.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        match trimmed.strip_prefix("0x") {
            Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
            }
            _ => Err(CoreError::InvalidTxHash(s.to_string())),
        }
    }

    /// The hash as `0x`-prefixed lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_conversions {
    ($ty:ident, $ctor:path) => {
        impl TryFrom<String> for $ty {
            type Error = CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                $ctor(&s)
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> String {
                v.0
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ctor(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

fn content_id_from_str(s: &str) -> Result<ContentId, CoreError> {
    ContentId::new(s)
}

string_newtype_conversions!(AccountAddress, AccountAddress::parse);
string_newtype_conversions!(MedicineId, MedicineId::parse);
string_newtype_conversions!(ContentId, content_id_from_str);
string_newtype_conversions!(TxHash, TxHash::parse);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn medicine_id_matches_integer_text(n in any::<u64>()) {
            let id = MedicineId::parse(&n.to_string()).unwrap();
            prop_assert_eq!(id, MedicineId::from_u64(n));
        }

        #[test]
        fn address_parse_is_idempotent(digits in "[0-9a-fA-F]{1,40}") {
            let once = AccountAddress::parse(&format!("0x{digits}")).unwrap();
            let twice = AccountAddress::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
