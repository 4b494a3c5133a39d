//! # Typed Ledger Records
//!
//! Decoded views of the tuples returned by the supply-chain contracts.
//! Every field is checked on the way in: a missing element or an element of
//! the wrong type is [`LedgerError::Malformed`], never a default value.
//!
//! Numeric and date fields are not reinterpreted. Prices stay 256-bit
//! quantities and dates stay the free text the manufacturer entered.

use pharma_core::{AccountAddress, MedicineId, MedicineStatus, Role, Timestamp};
use serde::Serialize;

use crate::abi::{self, DynSolValue, Returned, U256};
use crate::error::LedgerError;

/// Reader over decoded return values. Each field is taken by its declared
/// name when the interface names it, by position otherwise.
struct Fields<'a> {
    method: &'static str,
    returned: &'a Returned,
}

impl<'a> Fields<'a> {
    fn new(method: &'static str, returned: &'a Returned, required: usize) -> Result<Self, LedgerError> {
        if returned.len() < required {
            return Err(LedgerError::malformed(
                method,
                format!("expected {required} values, got {}", returned.len()),
            ));
        }
        Ok(Self { method, returned })
    }

    fn value(&self, name: &str, position: usize) -> Result<&'a DynSolValue, LedgerError> {
        self.returned
            .get(name, position)
            .ok_or_else(|| LedgerError::malformed(self.method, format!("missing {name} at position {}", position + 1)))
    }

    fn mismatch(&self, want: &str, name: &str) -> LedgerError {
        LedgerError::malformed(self.method, format!("expected {want} for {name}"))
    }

    fn uint(&self, name: &str, position: usize) -> Result<U256, LedgerError> {
        as_uint(self.value(name, position)?).ok_or_else(|| self.mismatch("uint256", name))
    }

    fn bool(&self, name: &str, position: usize) -> Result<bool, LedgerError> {
        self.value(name, position)?
            .as_bool()
            .ok_or_else(|| self.mismatch("bool", name))
    }

    fn string(&self, name: &str, position: usize) -> Result<String, LedgerError> {
        as_string(self.value(name, position)?).ok_or_else(|| self.mismatch("string", name))
    }

    fn address(&self, name: &str, position: usize) -> Result<AccountAddress, LedgerError> {
        as_account(self.value(name, position)?).ok_or_else(|| self.mismatch("address", name))
    }

    fn medicine_id(&self, name: &str, position: usize) -> Result<MedicineId, LedgerError> {
        let v = self.uint(name, position)?;
        MedicineId::parse(&v.to_string()).map_err(|e| LedgerError::malformed(self.method, e))
    }

    fn array<T>(
        &self,
        name: &str,
        position: usize,
        want: &str,
        item: impl Fn(&DynSolValue) -> Option<T>,
    ) -> Result<Vec<T>, LedgerError> {
        let DynSolValue::Array(items) = self.value(name, position)? else {
            return Err(self.mismatch(want, name));
        };
        items
            .iter()
            .map(|i| item(i).ok_or_else(|| self.mismatch(want, name)))
            .collect()
    }

    /// An array the interface may leave out. Absent is empty.
    fn optional_array<T>(
        &self,
        name: &str,
        position: usize,
        want: &str,
        item: impl Fn(&DynSolValue) -> Option<T>,
    ) -> Result<Vec<T>, LedgerError> {
        if self.returned.get(name, position).is_none() {
            return Ok(Vec::new());
        }
        self.array(name, position, want, item)
    }
}

fn as_uint(v: &DynSolValue) -> Option<U256> {
    v.as_uint().map(|(n, _)| n)
}

fn as_string(v: &DynSolValue) -> Option<String> {
    v.as_str().map(str::to_string)
}

fn as_account(v: &DynSolValue) -> Option<AccountAddress> {
    v.as_address().map(|a| abi::from_address(&a))
}

/// Fields a manufacturer enters to create a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicine {
    pub prefix: String,
    pub name: String,
    pub composition: String,
    pub description: String,
    pub manufacturer_date: String,
    pub expiry_date: String,
    #[serde(serialize_with = "abi::serialize_decimal")]
    pub price: U256,
}

/// Metadata document pinned before `createMedicine`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineMetadata<'a> {
    #[serde(flatten)]
    pub medicine: &'a NewMedicine,
    pub manufacturer: &'a AccountAddress,
    pub current_status: MedicineStatus,
}

impl NewMedicine {
    /// Metadata for a freshly manufactured record.
    pub fn metadata<'a>(&'a self, manufacturer: &'a AccountAddress) -> MedicineMetadata<'a> {
        MedicineMetadata {
            medicine: self,
            manufacturer,
            current_status: MedicineStatus::Manufacturing,
        }
    }
}

/// A medicine record snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: MedicineId,
    pub prefix: String,
    pub name: String,
    pub composition: String,
    pub description: String,
    pub manufacturer_date: String,
    pub expiry_date: String,
    #[serde(serialize_with = "abi::serialize_decimal")]
    pub price: U256,
    pub current_status: MedicineStatus,
    pub owner: AccountAddress,
    pub ipfs_hashes: Vec<String>,
}

impl Medicine {
    /// Decode a record returned by `medicines`, `getMedicineById` or
    /// `trackMedicine`. The mapping getter leaves out `ipfsHashes`; a record
    /// without them has none.
    pub fn from_returned(method: &'static str, returned: &Returned) -> Result<Self, LedgerError> {
        let f = Fields::new(method, returned, 10)?;
        Ok(Self {
            id: f.medicine_id("id", 0)?,
            prefix: f.string("prefix", 1)?,
            name: f.string("name", 2)?,
            composition: f.string("composition", 3)?,
            description: f.string("description", 4)?,
            manufacturer_date: f.string("manufacturerDate", 5)?,
            expiry_date: f.string("expiryDate", 6)?,
            price: f.uint("price", 7)?,
            current_status: MedicineStatus::from(f.string("currentStatus", 8)?),
            owner: f.address("owner", 9)?,
            ipfs_hashes: f.optional_array("ipfsHashes", 10, "string[]", as_string)?,
        })
    }

    /// The record as the full `getMedicineById` tuple, in declaration order.
    pub fn into_values(self) -> Result<Vec<DynSolValue>, LedgerError> {
        let id = abi::parse_decimal(self.id.as_str())?;
        Ok(vec![
            abi::uint(id),
            DynSolValue::String(self.prefix),
            DynSolValue::String(self.name),
            DynSolValue::String(self.composition),
            DynSolValue::String(self.description),
            DynSolValue::String(self.manufacturer_date),
            DynSolValue::String(self.expiry_date),
            abi::uint(self.price),
            DynSolValue::String(self.current_status.into()),
            abi::address(&self.owner),
            DynSolValue::Array(self.ipfs_hashes.into_iter().map(DynSolValue::String).collect()),
        ])
    }

    /// Whether `now` is past the expiry date. `None` if the stored date
    /// cannot be read as a calendar date.
    pub fn is_expired(&self, now: Timestamp) -> Option<bool> {
        Timestamp::parse_calendar_date(&self.expiry_date)
            .ok()
            .map(|expiry| now > expiry)
    }
}

/// One row of `getAllocatedMedicineByAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedMedicine {
    pub id: MedicineId,
    pub name: String,
    pub description: String,
    pub manufacturer_date: String,
    pub expiry_date: String,
    #[serde(serialize_with = "abi::serialize_decimal")]
    pub price: U256,
    pub ipfs_hash: String,
    pub current_status: MedicineStatus,
}

impl AllocatedMedicine {
    /// Zip the parallel arrays into rows. Arrays of unequal length are
    /// malformed.
    pub fn rows_from_returned(method: &'static str, returned: &Returned) -> Result<Vec<Self>, LedgerError> {
        let f = Fields::new(method, returned, 8)?;
        let ids = f.array("ids", 0, "uint256[]", as_uint)?;
        let names = f.array("names", 1, "string[]", as_string)?;
        let descriptions = f.array("descriptions", 2, "string[]", as_string)?;
        let manufacturer_dates = f.array("manufacturerDates", 3, "string[]", as_string)?;
        let expiry_dates = f.array("expiryDates", 4, "string[]", as_string)?;
        let prices = f.array("prices", 5, "uint256[]", as_uint)?;
        let ipfs_hashes = f.array("ipfsHashes", 6, "string[]", as_string)?;
        let statuses = f.array("currentStatuses", 7, "string[]", as_string)?;

        let n = ids.len();
        let lengths = [
            names.len(),
            descriptions.len(),
            manufacturer_dates.len(),
            expiry_dates.len(),
            prices.len(),
            ipfs_hashes.len(),
            statuses.len(),
        ];
        if lengths.iter().any(|l| *l != n) {
            return Err(LedgerError::malformed(method, "parallel arrays differ in length"));
        }

        let mut rows = Vec::with_capacity(n);
        let mut names = names.into_iter();
        let mut descriptions = descriptions.into_iter();
        let mut manufacturer_dates = manufacturer_dates.into_iter();
        let mut expiry_dates = expiry_dates.into_iter();
        let mut prices = prices.into_iter();
        let mut ipfs_hashes = ipfs_hashes.into_iter();
        let mut statuses = statuses.into_iter();
        for id in ids {
            let (
                Some(name),
                Some(description),
                Some(manufacturer_date),
                Some(expiry_date),
                Some(price),
                Some(ipfs_hash),
                Some(status),
            ) = (
                names.next(),
                descriptions.next(),
                manufacturer_dates.next(),
                expiry_dates.next(),
                prices.next(),
                ipfs_hashes.next(),
                statuses.next(),
            )
            else {
                return Err(LedgerError::malformed(method, "parallel arrays differ in length"));
            };
            rows.push(Self {
                id: MedicineId::parse(&id.to_string()).map_err(|e| LedgerError::malformed(method, e))?,
                name,
                description,
                manufacturer_date,
                expiry_date,
                price,
                ipfs_hash,
                current_status: MedicineStatus::from(status),
            });
        }
        Ok(rows)
    }
}

/// One account returned by `viewUsers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub address: AccountAddress,
    pub name: String,
    pub username: String,
    /// Decimal role code as stored on the ledger.
    pub role_code: String,
    pub company_name: String,
    pub license_number: String,
}

impl RegisteredUser {
    pub fn rows_from_returned(method: &'static str, returned: &Returned) -> Result<Vec<Self>, LedgerError> {
        let f = Fields::new(method, returned, 6)?;
        let addresses = f.array("addresses", 0, "address[]", as_account)?;
        let names = f.array("names", 1, "string[]", as_string)?;
        let usernames = f.array("usernames", 2, "string[]", as_string)?;
        let roles = f.array("roles", 3, "uint256[]", as_uint)?;
        let companies = f.array("companyNames", 4, "string[]", as_string)?;
        let licenses = f.array("licenseNumbers", 5, "string[]", as_string)?;

        let n = addresses.len();
        if [names.len(), usernames.len(), roles.len(), companies.len(), licenses.len()]
            .iter()
            .any(|l| *l != n)
        {
            return Err(LedgerError::malformed(method, "parallel arrays differ in length"));
        }

        Ok(addresses
            .into_iter()
            .zip(names)
            .zip(usernames)
            .zip(roles)
            .zip(companies)
            .zip(licenses)
            .map(
                |(((((address, name), username), role), company_name), license_number)| Self {
                    address,
                    name,
                    username,
                    role_code: role.to_string(),
                    company_name,
                    license_number,
                },
            )
            .collect())
    }

    /// The role, if the code is a known one.
    pub fn role(&self) -> Option<Role> {
        Role::from_code(&self.role_code).ok()
    }
}

/// Payload of the `MedicineCreated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineCreated {
    pub id: MedicineId,
    pub name: String,
    pub manufacturer: AccountAddress,
}

impl MedicineCreated {
    pub fn from_returned(returned: &Returned) -> Result<Self, LedgerError> {
        let f = Fields::new("MedicineCreated", returned, 3)?;
        Ok(Self {
            id: f.medicine_id("id", 0)?,
            name: f.string("name", 1)?,
            manufacturer: f.address("manufacturer", 2)?,
        })
    }
}

/// Decode a single `bool` return value.
pub fn decode_bool(method: &'static str, returned: &Returned) -> Result<bool, LedgerError> {
    Fields::new(method, returned, 1)?.bool("", 0)
}

/// Decode a single `uint256` return value.
pub fn decode_uint(method: &'static str, returned: &Returned) -> Result<U256, LedgerError> {
    Fields::new(method, returned, 1)?.uint("", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Outputs;

    fn owner() -> AccountAddress {
        AccountAddress::parse("0x00000000000000000000000000000000000000aa").unwrap()
    }

    fn sample() -> Medicine {
        Medicine {
            id: MedicineId::from_u64(7),
            prefix: "PCM".into(),
            name: "X".into(),
            composition: "acetaminophen".into(),
            description: "tablets".into(),
            manufacturer_date: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
            price: U256::from(100u64),
            current_status: MedicineStatus::QualityChecked,
            owner: owner(),
            ipfs_hashes: vec!["QmA".into()],
        }
    }

    const MEMBERS: [&str; 11] = [
        "id",
        "prefix",
        "name",
        "composition",
        "description",
        "manufacturerDate",
        "expiryDate",
        "price",
        "currentStatus",
        "owner",
        "ipfsHashes",
    ];

    #[test]
    fn medicine_decodes_from_flat_record() {
        let returned = Returned::positional(sample().into_values().unwrap());
        assert_eq!(Medicine::from_returned("getMedicineById", &returned).unwrap(), sample());
    }

    #[test]
    fn mapping_getter_without_hashes_decodes() {
        let mut values = sample().into_values().unwrap();
        values.pop();
        let data = abi::encode_params(&values);
        let outputs = Outputs::from_types(crate::contract::MEDICINES.outputs).unwrap();
        let returned = outputs.decode(&data).unwrap();

        let record = Medicine::from_returned("medicines", &returned).unwrap();
        assert_eq!(record.name, "X");
        assert_eq!(record.price, U256::from(100u64));
        assert!(record.ipfs_hashes.is_empty());
    }

    #[test]
    fn named_fields_are_found_out_of_order() {
        let mut pairs: Vec<(&str, DynSolValue)> =
            MEMBERS.into_iter().zip(sample().into_values().unwrap()).collect();
        pairs.reverse();
        let record = Medicine::from_returned("getMedicineById", &Returned::named(pairs)).unwrap();
        assert_eq!(record, sample());
    }

    #[test]
    fn short_tuple_is_malformed() {
        let mut values = sample().into_values().unwrap();
        values.truncate(9);
        let err = Medicine::from_returned("medicines", &Returned::positional(values)).unwrap_err();
        assert!(matches!(err, LedgerError::Malformed { .. }));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let mut values = sample().into_values().unwrap();
        values[2] = DynSolValue::Bool(true);
        let err = Medicine::from_returned("medicines", &Returned::positional(values)).unwrap_err();
        assert!(err.to_string().contains("expected string for name"));
    }

    #[test]
    fn medicine_serializes_camel_case_with_decimal_price() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["price"], "100");
        assert_eq!(json["currentStatus"], "Quality Checked");
        assert_eq!(json["manufacturerDate"], "2025-01-01");
    }

    #[test]
    fn expiry_check() {
        let m = sample();
        assert_eq!(m.is_expired(Timestamp::parse("2026-06-01T00:00:00Z").unwrap()), Some(false));
        assert_eq!(m.is_expired(Timestamp::parse("2027-06-01T00:00:00Z").unwrap()), Some(true));
        let undated = Medicine { expiry_date: "soon".into(), ..sample() };
        assert_eq!(undated.is_expired(Timestamp::now()), None);
    }

    #[test]
    fn metadata_document_shape() {
        let m = NewMedicine {
            prefix: "PCM".into(),
            name: "X".into(),
            composition: "c".into(),
            description: "d".into(),
            manufacturer_date: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
            price: U256::from(100u64),
        };
        let json = serde_json::to_value(m.metadata(&owner())).unwrap();
        assert_eq!(json["currentStatus"], "Manufacturing");
        assert_eq!(json["manufacturer"], owner().as_str());
        assert_eq!(json["expiryDate"], "2027-01-01");
        assert_eq!(json["price"], "100");
    }

    fn strings(v: &[&str]) -> DynSolValue {
        DynSolValue::Array(v.iter().map(|s| abi::string(s)).collect())
    }

    fn uints(v: &[u64]) -> DynSolValue {
        DynSolValue::Array(v.iter().map(|n| abi::uint(U256::from(*n))).collect())
    }

    #[test]
    fn allocated_rows_zip_parallel_arrays() {
        let returned = Returned::positional(vec![
            uints(&[1, 2]),
            strings(&["A", "B"]),
            strings(&["da", "db"]),
            strings(&["m1", "m2"]),
            strings(&["e1", "e2"]),
            uints(&[10, 20]),
            strings(&["QmA", "QmB"]),
            strings(&["InTransit", "Quality Checked"]),
        ]);
        let rows = AllocatedMedicine::rows_from_returned("getAllocatedMedicineByAddress", &returned).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].price, U256::from(20u64));
        assert_eq!(rows[0].current_status, MedicineStatus::InTransit);
    }

    #[test]
    fn allocated_rows_reject_ragged_arrays() {
        let returned = Returned::positional(vec![
            uints(&[1, 2]),
            strings(&["A"]),
            strings(&["da", "db"]),
            strings(&["m1", "m2"]),
            strings(&["e1", "e2"]),
            uints(&[10, 20]),
            strings(&["QmA", "QmB"]),
            strings(&["s", "s"]),
        ]);
        assert!(AllocatedMedicine::rows_from_returned("getAllocatedMedicineByAddress", &returned).is_err());
    }

    #[test]
    fn users_decode_with_roles() {
        let returned = Returned::positional(vec![
            DynSolValue::Array(vec![abi::address(&owner())]),
            strings(&["Acme"]),
            strings(&["acme"]),
            uints(&[2]),
            strings(&["Acme Ltd"]),
            strings(&["LIC-1"]),
        ]);
        let users = RegisteredUser::rows_from_returned("viewUsers", &returned).unwrap();
        assert_eq!(users[0].role(), Some(Role::Wholesaler));
        assert_eq!(users[0].address, owner());
        assert_eq!(users[0].company_name, "Acme Ltd");
    }

    #[test]
    fn created_event_decodes() {
        let ev = MedicineCreated::from_returned(&Returned::positional(vec![
            abi::uint(U256::from(3u64)),
            abi::string("X"),
            abi::address(&owner()),
        ]))
        .unwrap();
        assert_eq!(ev.id.as_str(), "3");
        assert_eq!(ev.manufacturer, owner());
    }

    #[test]
    fn scalar_returns() {
        let yes = Returned::positional(vec![DynSolValue::Bool(true)]);
        assert!(decode_bool("loginUser", &yes).unwrap());
        assert!(decode_bool("loginUser", &Returned::default()).is_err());
        let four = Returned::positional(vec![abi::uint(U256::from(4u64))]);
        assert_eq!(decode_uint("medicineCount", &four).unwrap(), U256::from(4u64));
    }
}
