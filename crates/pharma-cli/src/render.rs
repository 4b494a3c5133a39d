//! # Terminal Rendering
//!
//! Pure functions from view state and read models to text. Nothing here
//! performs I/O; callers print the returned strings.

use std::fmt::Write as _;

use pharma_client::{AllocatedMedicine, Medicine, RegisteredUser};
use pharma_workflow::{ErrorKind, MessageLevel, Outcome, ViewState};
use serde::Serialize;

/// The view after an action, as text.
pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();
    if let Some(message) = view.message() {
        let tag = match message.level {
            MessageLevel::Success => "OK",
            MessageLevel::Error => "ERROR",
        };
        let _ = writeln!(out, "{tag}: {}", message.text);
    }
    if let Some(tx) = view.last_transaction() {
        let _ = writeln!(out, "  Transaction: {tx}");
    }
    if let Some(link) = view.document_link() {
        let _ = writeln!(out, "  Document: {link}");
    }
    if let Some(record) = view.record() {
        out.push_str(&render_record(record));
    }
    if let Some(route) = view.redirect() {
        let _ = writeln!(out, "  Next: {route}");
    }
    out
}

/// Every field of one record, in ledger order.
pub fn render_record(record: &Medicine) -> String {
    let mut out = format!("  Medicine {}:\n", record.id);
    let lines = [
        ("prefix", record.prefix.as_str()),
        ("name", record.name.as_str()),
        ("composition", record.composition.as_str()),
        ("description", record.description.as_str()),
        ("manufacturerDate", record.manufacturer_date.as_str()),
        ("expiryDate", record.expiry_date.as_str()),
    ];
    for (key, value) in lines {
        let _ = writeln!(out, "    {key}: {value}");
    }
    let _ = writeln!(out, "    price: {}", record.price);
    let _ = writeln!(out, "    currentStatus: {}", record.current_status);
    let _ = writeln!(out, "    owner: {}", record.owner);
    for (i, hash) in record.ipfs_hashes.iter().enumerate() {
        let _ = writeln!(out, "    ipfsHashes[{i}]: {hash}");
    }
    out
}

#[derive(Serialize)]
struct ActionReport<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorKind>,
    view: &'a ViewState,
}

/// The outcome and view as pretty-printed JSON.
pub fn render_view_json(outcome: Outcome, view: &ViewState) -> serde_json::Result<String> {
    let (outcome, error) = match outcome {
        Outcome::Settled => ("settled", None),
        Outcome::Failed(kind) => ("failed", Some(kind)),
        Outcome::Rejected(kind) => ("rejected", Some(kind)),
    };
    serde_json::to_string_pretty(&ActionReport { outcome, error, view })
}

/// One line per record.
pub fn render_catalogue(title: &str, records: &[&Medicine]) -> String {
    if records.is_empty() {
        return format!("No medicines found for {title}.\n");
    }
    let mut out = format!("{title} ({}):\n", records.len());
    for m in records {
        let _ = writeln!(
            out,
            "  #{} {} {} [{}] price {} expires {}",
            m.id, m.prefix, m.name, m.current_status, m.price, m.expiry_date
        );
    }
    out
}

pub fn render_allocated(rows: &[AllocatedMedicine]) -> String {
    if rows.is_empty() {
        return "No medicines allocated to this account.\n".to_string();
    }
    let mut out = format!("Allocated medicines ({}):\n", rows.len());
    for row in rows {
        let _ = writeln!(
            out,
            "  #{} {} [{}] price {} expires {}",
            row.id, row.name, row.current_status, row.price, row.expiry_date
        );
        if !row.ipfs_hash.is_empty() {
            let _ = writeln!(out, "    Invoice: {}", row.ipfs_hash);
        }
    }
    out
}

pub fn render_users(title: &str, users: &[RegisteredUser]) -> String {
    if users.is_empty() {
        return format!("No {} registered.\n", title.to_lowercase());
    }
    let mut out = format!("{title} ({}):\n", users.len());
    for u in users {
        let _ = writeln!(
            out,
            "  {} {} ({}) licence {} at {}",
            u.name, u.username, u.company_name, u.license_number, u.address
        );
    }
    out
}

/// Serialize any read model for `--json`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_client::U256;
    use pharma_core::{AccountAddress, MedicineId, MedicineStatus};

    fn medicine(hashes: Vec<String>) -> Medicine {
        Medicine {
            id: MedicineId::from_u64(7),
            prefix: "PCM".into(),
            name: "Paracetamol".into(),
            composition: "acetaminophen".into(),
            description: "tablets".into(),
            manufacturer_date: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
            price: U256::from(100u64),
            current_status: MedicineStatus::QualityChecked,
            owner: AccountAddress::parse("0xaa").unwrap(),
            ipfs_hashes: hashes,
        }
    }

    #[test]
    fn empty_view_renders_nothing() {
        assert_eq!(render_view(&ViewState::new()), "");
    }

    #[test]
    fn catalogue_lists_each_record() {
        let m = medicine(vec![]);
        let text = render_catalogue("Medicines", &[&m]);
        assert!(text.starts_with("Medicines (1):"));
        assert!(text.contains("#7 PCM Paracetamol [Quality Checked] price 100"));
    }

    #[test]
    fn empty_catalogue_says_so() {
        assert_eq!(render_catalogue("Patients", &[]), "No medicines found for Patients.\n");
    }

    #[test]
    fn record_with_hashes_lists_them() {
        let text = render_record(&medicine(vec!["QmA".into(), "QmB".into()]));
        assert!(text.contains("ipfsHashes[1]: QmB"));
        assert!(text.contains("currentStatus: Quality Checked"));
    }

    #[test]
    fn users_render_with_company() {
        let users = vec![RegisteredUser {
            address: AccountAddress::parse("0xbb").unwrap(),
            name: "Acme".into(),
            username: "acme".into(),
            role_code: "2".into(),
            company_name: "Acme Ltd".into(),
            license_number: "L-1".into(),
        }];
        let text = render_users("Wholesalers", &users);
        assert!(text.contains("Acme acme (Acme Ltd) licence L-1"));
        assert_eq!(render_users("Wholesalers", &[]), "No wholesalers registered.\n");
    }

    #[test]
    fn json_report_carries_outcome() {
        let json = render_view_json(Outcome::Settled, &ViewState::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"], "settled");
        assert!(value["view"].is_object());
        assert!(value.get("error").is_none());

        let json = render_view_json(Outcome::Rejected(ErrorKind::Busy), &ViewState::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "busy");
    }
}
