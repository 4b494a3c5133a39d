//! # pharma-core -- Foundational Types for the Pharma Supply-Chain Front End
//!
//! Leaf crate of the workspace. Every other crate depends on `pharma-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `AccountAddress`, `ChainId`,
//!    `MedicineId`, `ContentId`, `TxHash` are distinct types with validated
//!    constructors. A content identifier cannot be passed where an account
//!    address is expected.
//!
//! 2. **Role codes are closed.** The ledger reports roles as decimal codes
//!    (`"1"`..`"5"`). [`Role`] is the only place those codes are interpreted,
//!    and [`route_for_role_code`] is the only place a code becomes a route.
//!
//! 3. **Injected time.** Anything that stamps a document takes a [`Clock`],
//!    so tests pin time with [`FixedClock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pharma-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod role;
pub mod route;
pub mod status;
pub mod temporal;

pub use error::CoreError;
pub use identity::{AccountAddress, ChainId, ContentId, MedicineId, TxHash};
pub use role::{route_for_role_code, Role};
pub use route::Route;
pub use status::MedicineStatus;
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
