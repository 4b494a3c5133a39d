//! # Contract Interface Description
//!
//! The supply-chain ledger is two contracts, `Register` and `SupplyChain`.
//! Their logic is external; this module pins the exact method names,
//! argument order and return shapes this front end depends on.
//!
//! | Contract | Method | Kind |
//! |----------|--------|------|
//! | Register | `registerUser(address,string,string,uint256,string,string,string)` | write |
//! | Register | `loginUser(string,string) -> bool` | read |
//! | Register | `getUserRole(address) -> uint256` | read |
//! | Register | `viewUsers() -> (address[],string[],string[],uint256[],string[],string[])` | read |
//! | SupplyChain | `createMedicine(string,string,string,string,string,string,uint256,string)` | write |
//! | SupplyChain | `medicines(uint256)` (mapping getter), `getMedicineById(uint256)`, `trackMedicine(uint256)` | read |
//! | SupplyChain | `medicineCount() -> uint256` | read |
//! | SupplyChain | `allocateMedicine`, `allocateDistributor`, `allocateMedicineToHospital` `(uint256,address,string)` | write |
//! | SupplyChain | `shipMedicineToHospital(uint256)` | write |
//! | SupplyChain | `performQualityCheck(uint256,bool)` | write |
//! | SupplyChain | `verifyIPFSHashes(uint256,string,string,string)` | write |
//! | SupplyChain | `sellMedicine(uint256)`, `buyMedicine(uint256)` | payable write |
//! | SupplyChain | `buyMedicineFromManufacturer(uint256)` | write |
//! | SupplyChain | `manageInventory(uint256,uint256,string)` | write |
//! | SupplyChain | `getAllocatedMedicineByAddress(address)` | read |
//!
//! Return shapes declared here are fallbacks. When the loaded artifact
//! declares a method, reads decode against the artifact's outputs instead
//! (see [`crate::artifact`]).

use std::fmt;

use pharma_core::{AccountAddress, ContentId, MedicineId, Role};
use serde::{Deserialize, Serialize};

use crate::abi::{self, AbiError, DynSolValue, Outputs, U256};
use crate::records::NewMedicine;

/// Which deployed contract a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    Register,
    SupplyChain,
}

impl ContractKind {
    /// Every method of this contract the front end calls.
    pub fn methods(&self) -> &'static [&'static MethodSpec] {
        match self {
            Self::Register => REGISTER_METHODS,
            Self::SupplyChain => SUPPLY_CHAIN_METHODS,
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => f.write_str("Register"),
            Self::SupplyChain => f.write_str("SupplyChain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    View,
    NonPayable,
    Payable,
}

/// One contract method. Types are canonical Solidity names.
///
/// `outputs` is the fallback return shape, used when the loaded artifact
/// does not declare the method.
#[derive(Debug, PartialEq, Eq)]
pub struct MethodSpec {
    pub contract: ContractKind,
    pub name: &'static str,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
    pub mutability: Mutability,
}

impl MethodSpec {
    /// `name(type,type)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = abi::keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    pub fn default_outputs(&self) -> Result<Outputs, AbiError> {
        Outputs::from_types(self.outputs)
    }

    pub fn is_view(&self) -> bool {
        self.mutability == Mutability::View
    }

    pub fn is_payable(&self) -> bool {
        self.mutability == Mutability::Payable
    }
}

/// One contract event. All parameters are non-indexed.
#[derive(Debug, PartialEq, Eq)]
pub struct EventSpec {
    pub contract: ContractKind,
    pub name: &'static str,
    pub inputs: &'static [&'static str],
}

impl EventSpec {
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    /// `topics[0]` of a log emitted by this event.
    pub fn topic(&self) -> [u8; 32] {
        abi::keccak256(self.signature().as_bytes()).0
    }
}

const U: &str = "uint256";
const S: &str = "string";
const A: &str = "address";
const B: &str = "bool";

/// Public getter for the `medicines` mapping. Solidity getters omit array
/// members, so the document hashes are absent here.
const MEDICINE_GETTER: &[&str] = &[U, S, S, S, S, S, S, U, S, A];
const MEDICINE_RECORD: &[&str] = &[U, S, S, S, S, S, S, U, S, A, "string[]"];

const fn view(
    contract: ContractKind,
    name: &'static str,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
) -> MethodSpec {
    MethodSpec {
        contract,
        name,
        inputs,
        outputs,
        mutability: Mutability::View,
    }
}

const fn send(
    contract: ContractKind,
    name: &'static str,
    inputs: &'static [&'static str],
    mutability: Mutability,
) -> MethodSpec {
    MethodSpec {
        contract,
        name,
        inputs,
        outputs: &[],
        mutability,
    }
}

use ContractKind::{Register as R, SupplyChain as SC};
use Mutability::{NonPayable, Payable};

pub static REGISTER_USER: MethodSpec = send(R, "registerUser", &[A, S, S, U, S, S, S], NonPayable);
pub static LOGIN_USER: MethodSpec = view(R, "loginUser", &[S, S], &[B]);
pub static GET_USER_ROLE: MethodSpec = view(R, "getUserRole", &[A], &[U]);
pub static VIEW_USERS: MethodSpec = view(
    R,
    "viewUsers",
    &[],
    &["address[]", "string[]", "string[]", "uint256[]", "string[]", "string[]"],
);

pub static CREATE_MEDICINE: MethodSpec =
    send(SC, "createMedicine", &[S, S, S, S, S, S, U, S], NonPayable);
pub static MEDICINES: MethodSpec = view(SC, "medicines", &[U], MEDICINE_GETTER);
pub static GET_MEDICINE_BY_ID: MethodSpec = view(SC, "getMedicineById", &[U], MEDICINE_RECORD);
pub static TRACK_MEDICINE: MethodSpec = view(SC, "trackMedicine", &[U], MEDICINE_RECORD);
pub static MEDICINE_COUNT: MethodSpec = view(SC, "medicineCount", &[], &[U]);
pub static ALLOCATE_MEDICINE: MethodSpec = send(SC, "allocateMedicine", &[U, A, S], NonPayable);
pub static ALLOCATE_DISTRIBUTOR: MethodSpec =
    send(SC, "allocateDistributor", &[U, A, S], NonPayable);
pub static ALLOCATE_MEDICINE_TO_HOSPITAL: MethodSpec =
    send(SC, "allocateMedicineToHospital", &[U, A, S], NonPayable);
pub static SHIP_MEDICINE_TO_HOSPITAL: MethodSpec =
    send(SC, "shipMedicineToHospital", &[U], NonPayable);
pub static PERFORM_QUALITY_CHECK: MethodSpec =
    send(SC, "performQualityCheck", &[U, B], NonPayable);
pub static VERIFY_IPFS_HASHES: MethodSpec =
    send(SC, "verifyIPFSHashes", &[U, S, S, S], NonPayable);
pub static SELL_MEDICINE: MethodSpec = send(SC, "sellMedicine", &[U], Payable);
pub static BUY_MEDICINE: MethodSpec = send(SC, "buyMedicine", &[U], Payable);
pub static BUY_MEDICINE_FROM_MANUFACTURER: MethodSpec =
    send(SC, "buyMedicineFromManufacturer", &[U], NonPayable);
pub static MANAGE_INVENTORY: MethodSpec = send(SC, "manageInventory", &[U, U, S], NonPayable);
pub static GET_ALLOCATED_MEDICINE_BY_ADDRESS: MethodSpec = view(
    SC,
    "getAllocatedMedicineByAddress",
    &[A],
    &[
        "uint256[]",
        "string[]",
        "string[]",
        "string[]",
        "string[]",
        "uint256[]",
        "string[]",
        "string[]",
    ],
);

/// Emitted by `createMedicine` with the new record's id.
pub static MEDICINE_CREATED: EventSpec = EventSpec {
    contract: SC,
    name: "MedicineCreated",
    inputs: &[U, S, A],
};

static REGISTER_METHODS: &[&MethodSpec] = &[&REGISTER_USER, &LOGIN_USER, &GET_USER_ROLE, &VIEW_USERS];

static SUPPLY_CHAIN_METHODS: &[&MethodSpec] = &[
    &CREATE_MEDICINE,
    &MEDICINES,
    &GET_MEDICINE_BY_ID,
    &TRACK_MEDICINE,
    &MEDICINE_COUNT,
    &ALLOCATE_MEDICINE,
    &ALLOCATE_DISTRIBUTOR,
    &ALLOCATE_MEDICINE_TO_HOSPITAL,
    &SHIP_MEDICINE_TO_HOSPITAL,
    &PERFORM_QUALITY_CHECK,
    &VERIFY_IPFS_HASHES,
    &SELL_MEDICINE,
    &BUY_MEDICINE,
    &BUY_MEDICINE_FROM_MANUFACTURER,
    &MANAGE_INVENTORY,
    &GET_ALLOCATED_MEDICINE_BY_ADDRESS,
];

/// Every event the front end decodes.
pub static EVENTS: &[&EventSpec] = &[&MEDICINE_CREATED];

/// Downstream party of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationTarget {
    /// Manufacturer to wholesaler.
    Wholesaler,
    /// Wholesaler to distributor.
    Distributor,
    /// Distributor to hospital.
    Hospital,
}

impl AllocationTarget {
    pub fn method(&self) -> &'static MethodSpec {
        match self {
            Self::Wholesaler => &ALLOCATE_MEDICINE,
            Self::Distributor => &ALLOCATE_DISTRIBUTOR,
            Self::Hospital => &ALLOCATE_MEDICINE_TO_HOSPITAL,
        }
    }

    /// Role allocating to this target.
    pub fn sender_role(&self) -> Role {
        match self {
            Self::Wholesaler => Role::Manufacturer,
            Self::Distributor => Role::Wholesaler,
            Self::Hospital => Role::Distributor,
        }
    }

    /// Role receiving the allocation.
    pub fn receiver_role(&self) -> Role {
        match self {
            Self::Wholesaler => Role::Wholesaler,
            Self::Distributor => Role::Distributor,
            Self::Hospital => Role::Hospital,
        }
    }
}

/// A method invocation with encoded-ready arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    method: &'static MethodSpec,
    args: Vec<DynSolValue>,
}

impl Call {
    /// Build a call, checking arguments against the signature.
    pub fn new(method: &'static MethodSpec, args: Vec<DynSolValue>) -> Result<Self, AbiError> {
        let types = abi::parse_types(method.inputs)?;
        if args.len() != types.len() || !args.iter().zip(&types).all(|(v, ty)| ty.matches(v)) {
            return Err(AbiError::ArgumentMismatch(method.signature()));
        }
        Ok(Self { method, args })
    }

    pub fn method(&self) -> &'static MethodSpec {
        self.method
    }

    pub fn args(&self) -> &[DynSolValue] {
        &self.args
    }

    /// Selector followed by the encoded arguments.
    pub fn calldata(&self) -> Vec<u8> {
        let mut data = self.method.selector().to_vec();
        data.extend_from_slice(&abi::encode_params(&self.args));
        data
    }

    pub fn register_user(
        account: &AccountAddress,
        name: &str,
        username: &str,
        role: Role,
        company_name: &str,
        license_number: &str,
        password: &str,
    ) -> Result<Self, AbiError> {
        Self::new(
            &REGISTER_USER,
            vec![
                abi::address(account),
                abi::string(name),
                abi::string(username),
                abi::uint(abi::parse_decimal(role.code())?),
                abi::string(company_name),
                abi::string(license_number),
                abi::string(password),
            ],
        )
    }

    pub fn login_user(username: &str, password: &str) -> Result<Self, AbiError> {
        Self::new(&LOGIN_USER, vec![abi::string(username), abi::string(password)])
    }

    pub fn get_user_role(account: &AccountAddress) -> Result<Self, AbiError> {
        Self::new(&GET_USER_ROLE, vec![abi::address(account)])
    }

    pub fn view_users() -> Result<Self, AbiError> {
        Self::new(&VIEW_USERS, vec![])
    }

    pub fn create_medicine(medicine: &NewMedicine, metadata: &ContentId) -> Result<Self, AbiError> {
        Self::new(
            &CREATE_MEDICINE,
            vec![
                abi::string(&medicine.prefix),
                abi::string(&medicine.name),
                abi::string(&medicine.composition),
                abi::string(&medicine.description),
                abi::string(&medicine.manufacturer_date),
                abi::string(&medicine.expiry_date),
                abi::uint(medicine.price),
                abi::string(metadata.as_str()),
            ],
        )
    }

    pub fn medicines(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&MEDICINES, vec![id_value(id)?])
    }

    pub fn get_medicine_by_id(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&GET_MEDICINE_BY_ID, vec![id_value(id)?])
    }

    pub fn track_medicine(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&TRACK_MEDICINE, vec![id_value(id)?])
    }

    pub fn medicine_count() -> Result<Self, AbiError> {
        Self::new(&MEDICINE_COUNT, vec![])
    }

    pub fn allocate(
        target: AllocationTarget,
        id: &MedicineId,
        to: &AccountAddress,
        invoice: &ContentId,
    ) -> Result<Self, AbiError> {
        Self::new(
            target.method(),
            vec![id_value(id)?, abi::address(to), abi::string(invoice.as_str())],
        )
    }

    pub fn ship_medicine_to_hospital(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&SHIP_MEDICINE_TO_HOSPITAL, vec![id_value(id)?])
    }

    pub fn perform_quality_check(id: &MedicineId, passed: bool) -> Result<Self, AbiError> {
        Self::new(&PERFORM_QUALITY_CHECK, vec![id_value(id)?, DynSolValue::Bool(passed)])
    }

    /// Documents in manufacturer, wholesaler, distributor order.
    pub fn verify_ipfs_hashes(id: &MedicineId, documents: &[ContentId; 3]) -> Result<Self, AbiError> {
        let mut args = vec![id_value(id)?];
        args.extend(documents.iter().map(|c| abi::string(c.as_str())));
        Self::new(&VERIFY_IPFS_HASHES, args)
    }

    pub fn sell_medicine(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&SELL_MEDICINE, vec![id_value(id)?])
    }

    pub fn buy_medicine(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&BUY_MEDICINE, vec![id_value(id)?])
    }

    pub fn buy_medicine_from_manufacturer(id: &MedicineId) -> Result<Self, AbiError> {
        Self::new(&BUY_MEDICINE_FROM_MANUFACTURER, vec![id_value(id)?])
    }

    pub fn manage_inventory(id: &MedicineId, quantity: U256, note: &ContentId) -> Result<Self, AbiError> {
        Self::new(
            &MANAGE_INVENTORY,
            vec![id_value(id)?, abi::uint(quantity), abi::string(note.as_str())],
        )
    }

    pub fn get_allocated_medicine_by_address(account: &AccountAddress) -> Result<Self, AbiError> {
        Self::new(&GET_ALLOCATED_MEDICINE_BY_ADDRESS, vec![abi::address(account)])
    }
}

fn id_value(id: &MedicineId) -> Result<DynSolValue, AbiError> {
    abi::parse_decimal(id.as_str()).map(abi::uint)
}
