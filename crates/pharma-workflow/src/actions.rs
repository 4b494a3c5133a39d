//! # Forms and Actions
//!
//! A [`Form`] is what the view collects: text fields keyed by name plus
//! attached files. [`FormKind::parse`] checks that every required field is
//! present and non-blank, then builds a typed [`Action`]. All of this is
//! local; an invalid form never reaches a remote collaborator.
//!
//! | Form | Required fields |
//! |------|-----------------|
//! | register | name, username, role, companyName, licenseNumber, password |
//! | login | username, password |
//! | create-medicine | prefix, name, composition, description, manufacturerDate, expiryDate, price |
//! | allocate-* | medicineId, toAddress, toName |
//! | quality-check | medicineId, passed |
//! | manage-inventory | medicineId, quantity |
//! | verify | medicineId + files manufacturerDocument, wholesalerDocument, distributorDocument |
//! | ship, sell, buy, buy-from-manufacturer, track | medicineId |

use std::collections::BTreeMap;
use std::fmt;

use pharma_client::abi;
use pharma_client::{AllocationTarget, ContractKind, NewMedicine, U256};
use pharma_core::{AccountAddress, MedicineId, Role, Route};
use serde::Serialize;

use crate::error::WorkflowError;

/// Files a hospital uploads to verify a delivery, in ledger argument order.
pub const VERIFY_DOCUMENTS: [&str; 3] = ["manufacturerDocument", "wholesalerDocument", "distributorDocument"];

/// Collected user input for one page.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: BTreeMap<String, String>,
    files: BTreeMap<String, Vec<u8>>,
}

// Field values may hold a password; only names are printed.
impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn attach(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    /// Builder form of [`Form::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.files.clear();
    }
}

/// A password that never appears in debug output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub role: Role,
    pub company_name: String,
    pub license_number: String,
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// A validated user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Register(Registration),
    Login(Credentials),
    CreateMedicine(NewMedicine),
    Allocate {
        target: AllocationTarget,
        id: MedicineId,
        to: AccountAddress,
        to_name: String,
    },
    Ship { id: MedicineId },
    QualityCheck { id: MedicineId, passed: bool },
    ManageInventory { id: MedicineId, quantity: U256 },
    Verify { id: MedicineId, documents: [Vec<u8>; 3] },
    Sell { id: MedicineId },
    Buy { id: MedicineId },
    BuyFromManufacturer { id: MedicineId },
    Track { id: MedicineId },
}

impl Action {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Register(_) => FormKind::Register,
            Self::Login(_) => FormKind::Login,
            Self::CreateMedicine(_) => FormKind::CreateMedicine,
            Self::Allocate { target, .. } => FormKind::Allocate(*target),
            Self::Ship { .. } => FormKind::Ship,
            Self::QualityCheck { .. } => FormKind::QualityCheck,
            Self::ManageInventory { .. } => FormKind::ManageInventory,
            Self::Verify { .. } => FormKind::Verify,
            Self::Sell { .. } => FormKind::Sell,
            Self::Buy { .. } => FormKind::Buy,
            Self::BuyFromManufacturer { .. } => FormKind::BuyFromManufacturer,
            Self::Track { .. } => FormKind::Track,
        }
    }
}

/// The kind of form a page submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Register,
    Login,
    CreateMedicine,
    Allocate(AllocationTarget),
    Ship,
    QualityCheck,
    ManageInventory,
    Verify,
    Sell,
    Buy,
    BuyFromManufacturer,
    Track,
}

impl FormKind {
    pub const ALL: [FormKind; 14] = [
        FormKind::Register,
        FormKind::Login,
        FormKind::CreateMedicine,
        FormKind::Allocate(AllocationTarget::Wholesaler),
        FormKind::Allocate(AllocationTarget::Distributor),
        FormKind::Allocate(AllocationTarget::Hospital),
        FormKind::Ship,
        FormKind::QualityCheck,
        FormKind::ManageInventory,
        FormKind::Verify,
        FormKind::Sell,
        FormKind::Buy,
        FormKind::BuyFromManufacturer,
        FormKind::Track,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::CreateMedicine => "create-medicine",
            Self::Allocate(AllocationTarget::Wholesaler) => "allocate-wholesaler",
            Self::Allocate(AllocationTarget::Distributor) => "allocate-distributor",
            Self::Allocate(AllocationTarget::Hospital) => "allocate-hospital",
            Self::Ship => "ship",
            Self::QualityCheck => "quality-check",
            Self::ManageInventory => "manage-inventory",
            Self::Verify => "verify",
            Self::Sell => "sell",
            Self::Buy => "buy",
            Self::BuyFromManufacturer => "buy-from-manufacturer",
            Self::Track => "track",
        }
    }

    /// Route of the page hosting this form.
    pub fn route(&self) -> Route {
        match self {
            Self::Register => Route::Register,
            Self::Login => Route::Login,
            Self::CreateMedicine => Route::Manufacturer,
            Self::Allocate(_) => Route::Allocate,
            Self::Ship => Route::Ship,
            Self::QualityCheck => Route::QualityCheck,
            Self::ManageInventory => Route::Distributor,
            Self::Verify => Route::Verify,
            Self::Sell => Route::Hospital,
            Self::Buy => Route::Buy,
            Self::BuyFromManufacturer => Route::Wholesaler,
            Self::Track => Route::Track,
        }
    }

    /// Contract the action binds to.
    pub fn contract(&self) -> ContractKind {
        match self {
            Self::Register | Self::Login => ContractKind::Register,
            _ => ContractKind::SupplyChain,
        }
    }

    /// Actions that settle after reads alone.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Login | Self::Track)
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Register => &["name", "username", "role", "companyName", "licenseNumber", "password"],
            Self::Login => &["username", "password"],
            Self::CreateMedicine => &[
                "prefix",
                "name",
                "composition",
                "description",
                "manufacturerDate",
                "expiryDate",
                "price",
            ],
            Self::Allocate(_) => &["medicineId", "toAddress", "toName"],
            Self::QualityCheck => &["medicineId", "passed"],
            Self::ManageInventory => &["medicineId", "quantity"],
            Self::Verify
            | Self::Ship
            | Self::Sell
            | Self::Buy
            | Self::BuyFromManufacturer
            | Self::Track => &["medicineId"],
        }
    }

    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            Self::Verify => &VERIFY_DOCUMENTS,
            _ => &[],
        }
    }

    /// Lead-in for a failure message on this page.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::Register => "Registration unsuccessful",
            Self::Login => "Login failed",
            Self::CreateMedicine => "Error adding medicine",
            Self::Allocate(_) => "Error allocating medicine",
            Self::Ship => "Error shipping medicine",
            Self::QualityCheck => "Error performing quality check",
            Self::ManageInventory => "Error managing inventory",
            Self::Verify => "Failed to verify IPFS hashes",
            Self::Sell => "Error selling medicine",
            Self::Buy => "Error buying medicine",
            Self::BuyFromManufacturer => "Failed to buy medicine",
            Self::Track => "Error tracking medicine",
        }
    }

    /// Validate `form` and build the action.
    pub fn parse(&self, form: &Form) -> Result<Action, WorkflowError> {
        for name in self.required_fields() {
            if form.field(name).map_or(true, |v| v.trim().is_empty()) {
                return Err(WorkflowError::missing(name));
            }
        }
        for name in self.required_files() {
            if form.file(name).map_or(true, <[u8]>::is_empty) {
                return Err(WorkflowError::missing(name));
            }
        }

        let r = Reader(form);
        Ok(match *self {
            Self::Register => Action::Register(Registration {
                name: r.text("name")?,
                username: r.text("username")?,
                role: r.role("role")?,
                company_name: r.text("companyName")?,
                license_number: r.text("licenseNumber")?,
                password: Secret(r.raw("password")?),
            }),
            Self::Login => Action::Login(Credentials {
                username: r.text("username")?,
                password: Secret(r.raw("password")?),
            }),
            Self::CreateMedicine => Action::CreateMedicine(NewMedicine {
                prefix: r.text("prefix")?,
                name: r.text("name")?,
                composition: r.text("composition")?,
                description: r.text("description")?,
                manufacturer_date: r.text("manufacturerDate")?,
                expiry_date: r.text("expiryDate")?,
                price: r.uint("price")?,
            }),
            Self::Allocate(target) => Action::Allocate {
                target,
                id: r.medicine_id()?,
                to: r.address("toAddress")?,
                to_name: r.text("toName")?,
            },
            Self::Ship => Action::Ship { id: r.medicine_id()? },
            Self::QualityCheck => Action::QualityCheck {
                id: r.medicine_id()?,
                passed: r.flag("passed")?,
            },
            Self::ManageInventory => Action::ManageInventory {
                id: r.medicine_id()?,
                quantity: r.uint("quantity")?,
            },
            Self::Verify => Action::Verify {
                id: r.medicine_id()?,
                documents: [
                    r.file(VERIFY_DOCUMENTS[0])?,
                    r.file(VERIFY_DOCUMENTS[1])?,
                    r.file(VERIFY_DOCUMENTS[2])?,
                ],
            },
            Self::Sell => Action::Sell { id: r.medicine_id()? },
            Self::Buy => Action::Buy { id: r.medicine_id()? },
            Self::BuyFromManufacturer => Action::BuyFromManufacturer { id: r.medicine_id()? },
            Self::Track => Action::Track { id: r.medicine_id()? },
        })
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown form: {s}"))
    }
}

/// Typed access to a form whose required fields are known to be present.
struct Reader<'a>(&'a Form);

impl Reader<'_> {
    fn raw(&self, name: &str) -> Result<String, WorkflowError> {
        self.0
            .field(name)
            .map(str::to_string)
            .ok_or_else(|| WorkflowError::missing(name))
    }

    fn text(&self, name: &str) -> Result<String, WorkflowError> {
        self.raw(name).map(|v| v.trim().to_string())
    }

    fn medicine_id(&self) -> Result<MedicineId, WorkflowError> {
        MedicineId::parse(&self.text("medicineId")?).map_err(|e| WorkflowError::invalid("medicineId", e))
    }

    fn address(&self, name: &str) -> Result<AccountAddress, WorkflowError> {
        AccountAddress::parse(&self.text(name)?).map_err(|e| WorkflowError::invalid(name, e))
    }

    fn uint(&self, name: &str) -> Result<U256, WorkflowError> {
        abi::parse_decimal(&self.text(name)?).map_err(|e| WorkflowError::invalid(name, e))
    }

    /// A role code (`"1"`..`"5"`) or role name.
    fn role(&self, name: &str) -> Result<Role, WorkflowError> {
        let v = self.text(name)?;
        Role::from_code(&v)
            .ok()
            .or_else(|| Role::ALL.into_iter().find(|r| r.to_string().eq_ignore_ascii_case(&v)))
            .ok_or_else(|| WorkflowError::invalid(name, format!("unknown role {v}")))
    }

    fn flag(&self, name: &str) -> Result<bool, WorkflowError> {
        match self.text(name)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "pass" | "passed" | "1" => Ok(true),
            "false" | "no" | "fail" | "failed" | "0" => Ok(false),
            other => Err(WorkflowError::invalid(name, format!("expected pass or fail, got {other}"))),
        }
    }

    fn file(&self, name: &str) -> Result<Vec<u8>, WorkflowError> {
        self.0
            .file(name)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| WorkflowError::missing(name))
    }
}
