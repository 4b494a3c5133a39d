//! # Client-Side Routes
//!
//! One route per page. No route takes query parameters; all state lives in
//! the page's form inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A page of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    Register,
    Login,
    Manufacturer,
    Wholesaler,
    Distributor,
    Hospital,
    Patient,
    Allocate,
    Ship,
    QualityCheck,
    Verify,
    Buy,
    Track,
}

impl Route {
    /// Every route, in navigation order.
    pub const ALL: [Route; 14] = [
        Route::Home,
        Route::Register,
        Route::Login,
        Route::Manufacturer,
        Route::Wholesaler,
        Route::Distributor,
        Route::Hospital,
        Route::Patient,
        Route::Allocate,
        Route::Ship,
        Route::QualityCheck,
        Route::Verify,
        Route::Buy,
        Route::Track,
    ];

    /// URL path of the route.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Register => "/register",
            Self::Login => "/login",
            Self::Manufacturer => "/manufacturer",
            Self::Wholesaler => "/wholesaler",
            Self::Distributor => "/distributor",
            Self::Hospital => "/hospital",
            Self::Patient => "/patient",
            Self::Allocate => "/allocate",
            Self::Ship => "/ship",
            Self::QualityCheck => "/quality-check",
            Self::Verify => "/verify",
            Self::Buy => "/buy",
            Self::Track => "/track",
        }
    }

    /// Whether the route is a role dashboard.
    pub fn is_dashboard(&self) -> bool {
        matches!(
            self,
            Self::Manufacturer | Self::Wholesaler | Self::Distributor | Self::Hospital | Self::Patient
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|r| r.path() == s)
            .ok_or_else(|| format!("unknown route {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_back() {
        for route in Route::ALL {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn paths_have_no_query_parameters() {
        assert!(Route::ALL.iter().all(|r| !r.path().contains('?')));
    }

    #[test]
    fn dashboards_are_the_five_roles() {
        assert_eq!(Route::ALL.iter().filter(|r| r.is_dashboard()).count(), 5);
        assert!(!Route::Track.is_dashboard());
    }
}
