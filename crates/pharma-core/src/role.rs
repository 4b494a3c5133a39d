//! # Participant Roles
//!
//! The ledger's registration contract stores a role code per account. Codes
//! are decimal strings as returned by the ledger:
//!
//! | Code | Role | Dashboard |
//! |------|------|-----------|
//! | `1` | Manufacturer | `/manufacturer` |
//! | `2` | Wholesaler | `/wholesaler` |
//! | `3` | Distributor | `/distributor` |
//! | `4` | Hospital | `/hospital` |
//! | `5` | Patient | `/patient` |
//!
//! Any other code routes to `/`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::route::Route;

/// A supply-chain participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manufacturer,
    Wholesaler,
    Distributor,
    Hospital,
    Patient,
}

impl Role {
    /// All roles in code order.
    pub const ALL: [Role; 5] = [
        Role::Manufacturer,
        Role::Wholesaler,
        Role::Distributor,
        Role::Hospital,
        Role::Patient,
    ];

    /// The ledger code for this role.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Manufacturer => "1",
            Self::Wholesaler => "2",
            Self::Distributor => "3",
            Self::Hospital => "4",
            Self::Patient => "5",
        }
    }

    /// Interpret a ledger role code.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code.trim() {
            "1" => Ok(Self::Manufacturer),
            "2" => Ok(Self::Wholesaler),
            "3" => Ok(Self::Distributor),
            "4" => Ok(Self::Hospital),
            "5" => Ok(Self::Patient),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }

    /// Dashboard route a user of this role lands on after login.
    pub fn dashboard(&self) -> Route {
        match self {
            Self::Manufacturer => Route::Manufacturer,
            Self::Wholesaler => Route::Wholesaler,
            Self::Distributor => Route::Distributor,
            Self::Hospital => Route::Hospital,
            Self::Patient => Route::Patient,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Manufacturer => "Manufacturer",
            Self::Wholesaler => "Wholesaler",
            Self::Distributor => "Distributor",
            Self::Hospital => "Hospital",
            Self::Patient => "Patient",
        };
        f.write_str(s)
    }
}

/// Post-login redirect: the role's dashboard, or `/` for an unknown code.
pub fn route_for_role_code(code: &str) -> Route {
    Role::from_code(code)
        .map(|r| r.dashboard())
        .unwrap_or(Route::Home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wholesaler_code_routes_to_wholesaler_dashboard() {
        assert_eq!(route_for_role_code("2"), Route::Wholesaler);
        assert_eq!(route_for_role_code("2").path(), "/wholesaler");
    }

    #[test]
    fn hospital_code_routes_to_hospital_dashboard() {
        assert_eq!(route_for_role_code("4").path(), "/hospital");
    }

    #[test]
    fn unknown_code_routes_home() {
        assert_eq!(route_for_role_code("9"), Route::Home);
        assert_eq!(route_for_role_code(""), Route::Home);
        assert_eq!(route_for_role_code("0").path(), "/");
    }

    #[test]
    fn codes_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_code(role.code()).unwrap(), role);
        }
    }
}
