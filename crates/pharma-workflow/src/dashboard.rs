//! # Dashboard Read Models
//!
//! Read-only views the role dashboards render. None of these write, so
//! they bypass the state machine; failures are returned to the caller.
//!
//! The catalogue is read one record at a time, `medicines(1)` through
//! `medicines(count)`, in order. A count above the configured catalogue
//! limit is refused before any record is read.

use pharma_client::records::decode_uint;
use pharma_client::{AllocatedMedicine, Call, ContractKind, Medicine, RegisteredUser};
use pharma_core::{MedicineId, Role};

use crate::error::WorkflowError;
use crate::page::Page;

impl Page {
    /// Every record on the ledger, oldest first.
    pub async fn catalogue(&self) -> Result<Vec<Medicine>, WorkflowError> {
        let (_, binding) = self.bind(ContractKind::SupplyChain).await?;
        let returned = self.read(&binding, Call::medicine_count()?, None).await?;
        let count = decode_uint("medicineCount", &returned)?;
        let limit = self.settings().catalogue_limit;
        let count = u64::try_from(count)
            .ok()
            .filter(|n| *n <= limit)
            .ok_or_else(|| {
                tracing::warn!(%count, limit, "medicine count exceeds catalogue limit");
                WorkflowError::MalformedResponse(format!("medicineCount {count} exceeds catalogue limit {limit}"))
            })?;

        let mut records = Vec::new();
        for i in 1..=count {
            let returned = self
                .read(&binding, Call::medicines(&MedicineId::from_u64(i))?, None)
                .await?;
            records.push(Medicine::from_returned("medicines", &returned)?);
        }
        tracing::debug!(count, "catalogue loaded");
        Ok(records)
    }

    /// Records allocated to the session's account.
    pub async fn allocated_to_me(&self) -> Result<Vec<AllocatedMedicine>, WorkflowError> {
        let (session, binding) = self.bind(ContractKind::SupplyChain).await?;
        let returned = self
            .read(
                &binding,
                Call::get_allocated_medicine_by_address(&session.account)?,
                Some(&session.account),
            )
            .await?;
        Ok(AllocatedMedicine::rows_from_returned("getAllocatedMedicineByAddress", &returned)?)
    }

    /// Registered users holding `role`.
    pub async fn users_with_role(&self, role: Role) -> Result<Vec<RegisteredUser>, WorkflowError> {
        let (_, binding) = self.bind(ContractKind::Register).await?;
        let returned = self.read(&binding, Call::view_users()?, None).await?;
        let users = RegisteredUser::rows_from_returned("viewUsers", &returned)?;
        Ok(users.into_iter().filter(|u| u.role() == Some(role)).collect())
    }
}

/// Records shown on the patient dashboard.
pub fn patient_visible(records: &[Medicine]) -> Vec<&Medicine> {
    records.iter().filter(|m| m.current_status.is_patient_visible()).collect()
}

/// Records a patient can buy.
pub fn purchasable(records: &[Medicine]) -> Vec<&Medicine> {
    records.iter().filter(|m| m.current_status.is_purchasable()).collect()
}

/// Records a distributor can ship or allocate onward.
pub fn shippable(records: &[Medicine]) -> Vec<&Medicine> {
    records.iter().filter(|m| m.current_status.is_shippable()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_client::U256;
    use pharma_core::{AccountAddress, MedicineStatus};

    fn record(id: u64, status: MedicineStatus) -> Medicine {
        Medicine {
            id: MedicineId::from_u64(id),
            prefix: "P".into(),
            name: format!("M{id}"),
            composition: String::new(),
            description: String::new(),
            manufacturer_date: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
            price: U256::from(10u64),
            current_status: status,
            owner: AccountAddress::parse("0x01").unwrap(),
            ipfs_hashes: vec![],
        }
    }

    #[test]
    fn filters_by_status() {
        let records = vec![
            record(1, MedicineStatus::Manufacturing),
            record(2, MedicineStatus::QualityChecked),
            record(3, MedicineStatus::InTransit),
            record(4, MedicineStatus::VerifiedAndDelivered),
            record(5, MedicineStatus::Purchased),
        ];
        let ids = |v: Vec<&Medicine>| v.iter().map(|m| m.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(patient_visible(&records)), ["4", "5"]);
        assert_eq!(ids(purchasable(&records)), ["4"]);
        assert_eq!(ids(shippable(&records)), ["2", "3"]);
    }
}
