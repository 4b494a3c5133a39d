//! # Contract ABI Values
//!
//! Solidity values are [`DynSolValue`]s and their types [`DynSolType`]s,
//! both from `alloy-dyn-abi`. This module adds what the supply-chain
//! contracts need on top:
//!
//! - conversions between [`AccountAddress`] and alloy's [`Address`]
//! - decimal parsing of user-entered 256-bit quantities
//! - [`Outputs`]: a method's declared return parameters, names included,
//!   and [`Returned`]: the values decoded against them
//!
//! Return values are looked up by declared name where the interface names
//! them, and by position otherwise. A struct returned as a single tuple is
//! flattened into its named members, so `returns (Medicine memory)` and a
//! public mapping getter decode to the same fields.

use alloy_json_abi::Param;
use pharma_core::AccountAddress;
use serde::Serializer;

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use alloy_primitives::{keccak256, Address, U256};

/// ABI codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("invalid decimal quantity {0:?}")]
    InvalidDecimal(String),
    #[error("decimal quantity {0:?} exceeds 256 bits")]
    Overflow(String),
    #[error("invalid hex data: {0}")]
    InvalidHex(String),
    #[error("unsupported parameter type {ty:?}: {reason}")]
    InvalidType { ty: String, reason: String },
    #[error("cannot decode return data: {0}")]
    Decode(String),
    #[error("arguments do not match {0}")]
    ArgumentMismatch(String),
}

/// Parse a non-negative decimal integer.
pub fn parse_decimal(s: &str) -> Result<U256, AbiError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AbiError::InvalidDecimal(s.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| AbiError::Overflow(s.to_string()))
}

/// JSON-RPC quantity form (`0x0`, `0x4563918244f40000`).
pub fn hex_quantity(value: &U256) -> String {
    format!("0x{value:x}")
}

/// Serialize a quantity as decimal text; JSON numbers cannot hold 256 bits.
pub fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed (or bare) hex.
pub fn from_hex_data(s: &str) -> Result<Vec<u8>, AbiError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

/// Left-pad an account to 20 bytes. Short forms keep their numeric value.
pub fn to_address(account: &AccountAddress) -> Address {
    let mut bytes = [0u8; 20];
    let nibbles = account.hex_digits().chars().rev().filter_map(|c| c.to_digit(16));
    for (i, nibble) in nibbles.enumerate() {
        let idx = 19 - i / 2;
        bytes[idx] |= if i % 2 == 0 { nibble as u8 } else { (nibble as u8) << 4 };
    }
    Address::from(bytes)
}

pub fn from_address(address: &Address) -> AccountAddress {
    AccountAddress::from_bytes(&address.0 .0)
}

pub fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

pub fn string(s: &str) -> DynSolValue {
    DynSolValue::String(s.to_string())
}

pub fn address(account: &AccountAddress) -> DynSolValue {
    DynSolValue::Address(to_address(account))
}

/// Encode `values` as a parameter list (no selector).
pub fn encode_params(values: &[DynSolValue]) -> Vec<u8> {
    DynSolValue::Tuple(values.to_vec()).abi_encode_params()
}

fn parse_type(ty: &str) -> Result<DynSolType, AbiError> {
    DynSolType::parse(ty).map_err(|e| AbiError::InvalidType {
        ty: ty.to_string(),
        reason: e.to_string(),
    })
}

/// Parse canonical type names (`uint256`, `string[]`).
pub fn parse_types(types: &[&str]) -> Result<Vec<DynSolType>, AbiError> {
    types.iter().map(|t| parse_type(t)).collect()
}

/// One declared return parameter.
#[derive(Debug, Clone)]
struct Output {
    name: String,
    canonical: String,
    ty: DynSolType,
    /// Member names when the parameter is a struct.
    members: Vec<String>,
}

/// Declared return parameters of a method.
#[derive(Debug, Clone)]
pub struct Outputs(Vec<Output>);

impl Outputs {
    /// Unnamed outputs from canonical type names.
    pub fn from_types(types: &[&str]) -> Result<Self, AbiError> {
        types
            .iter()
            .map(|t| {
                Ok(Output {
                    name: String::new(),
                    canonical: t.to_string(),
                    ty: parse_type(t)?,
                    members: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Outputs as declared in a JSON interface description.
    pub fn from_params(params: &[Param]) -> Result<Self, AbiError> {
        params
            .iter()
            .map(|p| {
                let canonical = p.selector_type().into_owned();
                Ok(Output {
                    name: p.name.clone(),
                    ty: parse_type(&canonical)?,
                    canonical,
                    members: p.components.iter().map(|c| c.name.clone()).collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(uint256,string)`.
    pub fn canonical(&self) -> String {
        let types: Vec<&str> = self.0.iter().map(|o| o.canonical.as_str()).collect();
        format!("({})", types.join(","))
    }

    /// Decode return data against these outputs.
    pub fn decode(&self, data: &[u8]) -> Result<Returned, AbiError> {
        let tuple = DynSolType::Tuple(self.0.iter().map(|o| o.ty.clone()).collect());
        let decoded = tuple
            .abi_decode_params(data)
            .map_err(|e| AbiError::Decode(e.to_string()))?;
        let DynSolValue::Tuple(values) = decoded else {
            return Err(AbiError::Decode("return data is not a tuple".to_string()));
        };

        if let [single] = self.0.as_slice() {
            if !single.members.is_empty() {
                if let [DynSolValue::Tuple(fields)] = values.as_slice() {
                    return Ok(Returned(
                        single.members.iter().cloned().zip(fields.iter().cloned()).collect(),
                    ));
                }
            }
        }
        Ok(Returned(
            self.0.iter().map(|o| o.name.clone()).zip(values).collect(),
        ))
    }
}

/// Values returned by a read, paired with their declared names (empty when
/// the interface leaves them unnamed).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Returned(Vec<(String, DynSolValue)>);

impl Returned {
    /// Unnamed values, looked up by position only.
    pub fn positional(values: Vec<DynSolValue>) -> Self {
        Self(values.into_iter().map(|v| (String::new(), v)).collect())
    }

    /// Values paired with names.
    pub fn named<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, DynSolValue)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value declared as `name`, else the one at `position`.
    pub fn get(&self, name: &str, position: usize) -> Option<&DynSolValue> {
        self.0
            .iter()
            .find(|(n, _)| !n.is_empty() && n == name)
            .or_else(|| self.0.get(position))
            .map(|(_, v)| v)
    }

    pub fn values(&self) -> impl Iterator<Item = &DynSolValue> {
        self.0.iter().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UINT256_MAX: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn decimal_limits() {
        assert_eq!(parse_decimal(UINT256_MAX).unwrap(), U256::MAX);
        assert!(matches!(
            parse_decimal("115792089237316195423570985008687907853269984665640564039457584007913129639936"),
            Err(AbiError::Overflow(_))
        ));
        assert!(matches!(parse_decimal("12a"), Err(AbiError::InvalidDecimal(_))));
        assert!(matches!(parse_decimal(""), Err(AbiError::InvalidDecimal(_))));
        assert_eq!(parse_decimal(" 42 ").unwrap(), U256::from(42u64));
    }

    #[test]
    fn five_ether_hex_quantity() {
        let wei = parse_decimal("5000000000000000000").unwrap();
        assert_eq!(hex_quantity(&wei), "0x4563918244f40000");
        assert_eq!(hex_quantity(&U256::ZERO), "0x0");
    }

    #[test]
    fn short_address_is_left_padded() {
        let addr = to_address(&AccountAddress::parse("0xABC").unwrap());
        assert_eq!(addr.as_slice()[18], 0x0a);
        assert_eq!(addr.as_slice()[19], 0xbc);
        assert!(addr.as_slice()[..18].iter().all(|b| *b == 0));
        assert_eq!(from_address(&addr).as_str(), "0x0000000000000000000000000000000000000abc");
    }

    #[test]
    fn positional_decode_of_flat_return() {
        let outputs = Outputs::from_types(&["uint256", "string", "string[]"]).unwrap();
        let data = encode_params(&[
            uint(U256::from(7u64)),
            string("Paracetamol"),
            DynSolValue::Array(vec![string("QmA")]),
        ]);
        let returned = outputs.decode(&data).unwrap();
        assert_eq!(returned.len(), 3);
        assert_eq!(returned.get("name", 1), Some(&string("Paracetamol")));
        assert_eq!(outputs.canonical(), "(uint256,string,string[])");
    }

    #[test]
    fn struct_return_is_flattened_by_member_name() {
        let param: Param = serde_json::from_value(serde_json::json!({
            "name": "",
            "type": "tuple",
            "internalType": "struct SupplyChain.Medicine",
            "components": [
                {"name": "id", "type": "uint256", "internalType": "uint256"},
                {"name": "name", "type": "string", "internalType": "string"}
            ]
        }))
        .unwrap();
        let outputs = Outputs::from_params(&[param]).unwrap();
        let data = DynSolValue::Tuple(vec![DynSolValue::Tuple(vec![uint(U256::from(9u64)), string("X")])])
            .abi_encode_params();

        let returned = outputs.decode(&data).unwrap();
        assert_eq!(returned.len(), 2);
        assert_eq!(returned.get("name", 99), Some(&string("X")));
        assert_eq!(returned.get("id", 99), Some(&uint(U256::from(9u64))));
    }

    #[test]
    fn names_win_over_positions() {
        let returned = Returned::named([("b", string("second")), ("a", string("first"))]);
        assert_eq!(returned.get("a", 0), Some(&string("first")));
        assert_eq!(returned.get("missing", 0), Some(&string("second")));
        assert_eq!(returned.get("missing", 5), None);
    }

    #[test]
    fn truncated_data_is_a_decode_error() {
        let outputs = Outputs::from_types(&["string"]).unwrap();
        let data = encode_params(&[string("hello")]);
        assert!(matches!(outputs.decode(&data[..40]), Err(AbiError::Decode(_))));
        assert!(Outputs::from_types(&["uint256"]).unwrap().decode(&[]).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            Outputs::from_types(&["notatype"]),
            Err(AbiError::InvalidType { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decimal_agrees_with_u128(n in any::<u128>()) {
            prop_assert_eq!(parse_decimal(&n.to_string()).unwrap(), U256::from(n));
        }

        #[test]
        fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let outputs = Outputs::from_types(&["uint256", "string[]", "string"]).unwrap();
            let _ = outputs.decode(&data);
        }

        #[test]
        fn full_width_addresses_survive_conversion(bytes in any::<[u8; 20]>()) {
            let address = Address::from(bytes);
            prop_assert_eq!(to_address(&from_address(&address)), address);
        }
    }
}
