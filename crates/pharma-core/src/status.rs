//! # Medicine Status Vocabulary
//!
//! Status strings are written by the ledger contract; this code only reads
//! them. Known values get a variant so dashboards can filter on them, and
//! anything else is preserved verbatim in [`MedicineStatus::Other`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current status of a medicine record as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MedicineStatus {
    Manufacturing,
    QualityChecked,
    QualityCheckFailed,
    InTransit,
    VerifiedAndDelivered,
    Purchased,
    Other(String),
}

impl MedicineStatus {
    /// The exact ledger string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manufacturing => "Manufacturing",
            Self::QualityChecked => "Quality Checked",
            Self::QualityCheckFailed => "Quality Check Failed",
            Self::InTransit => "InTransit",
            Self::VerifiedAndDelivered => "verified and Delivered",
            Self::Purchased => "Purchased",
            Self::Other(s) => s,
        }
    }

    /// Status shown after a quality check with the given outcome.
    pub fn after_quality_check(passed: bool) -> Self {
        if passed {
            Self::QualityChecked
        } else {
            Self::QualityCheckFailed
        }
    }

    /// Delivered to a hospital and available to patients.
    pub fn is_purchasable(&self) -> bool {
        matches!(self, Self::VerifiedAndDelivered)
    }

    /// Visible on the patient dashboard.
    pub fn is_patient_visible(&self) -> bool {
        matches!(self, Self::Purchased | Self::VerifiedAndDelivered)
    }

    /// Eligible for allocation or shipment to a hospital.
    pub fn is_shippable(&self) -> bool {
        matches!(self, Self::QualityChecked | Self::InTransit)
    }
}

impl From<String> for MedicineStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Manufacturing" => Self::Manufacturing,
            "Quality Checked" => Self::QualityChecked,
            "Quality Check Failed" => Self::QualityCheckFailed,
            "InTransit" => Self::InTransit,
            "verified and Delivered" => Self::VerifiedAndDelivered,
            "Purchased" => Self::Purchased,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for MedicineStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<MedicineStatus> for String {
    fn from(s: MedicineStatus) -> String {
        s.as_str().to_string()
    }
}

impl fmt::Display for MedicineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
