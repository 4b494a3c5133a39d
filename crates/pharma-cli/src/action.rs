//! # Action Subcommands
//!
//! One subcommand per page form. Flags map one-to-one onto form fields;
//! a missing flag is an empty field, which the orchestrator rejects with
//! the page's "Please fill in ..." message before any remote call.
//!
//! Each invocation drives a single [`Trigger`], exactly as one press of
//! the page's submit control.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use pharma_client::AllocationTarget;
use pharma_invoice::render_qr_svg;
use pharma_workflow::actions::VERIFY_DOCUMENTS;
use pharma_workflow::{Form, FormKind, Orchestrator, Outcome, Page, Trigger};

use crate::context::OutputOptions;
use crate::render::{render_view, render_view_json};
use crate::{EXIT_FAILED, EXIT_OK, EXIT_REJECTED};

/// Receiving side of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Manufacturer to wholesaler.
    Wholesaler,
    /// Wholesaler to distributor.
    Distributor,
    /// Distributor to hospital.
    Hospital,
}

impl From<TargetArg> for AllocationTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Wholesaler => AllocationTarget::Wholesaler,
            TargetArg::Distributor => AllocationTarget::Distributor,
            TargetArg::Hospital => AllocationTarget::Hospital,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    /// Register the connected account.
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Role code (1-5) or name (manufacturer, wholesaler, ...).
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        license_number: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and print the dashboard route for the account's role.
    Login {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Create a medicine record (manufacturer).
    CreateMedicine {
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        composition: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Manufacturing date, YYYY-MM-DD.
        #[arg(long)]
        manufacturer_date: Option<String>,
        /// Expiry date, YYYY-MM-DD.
        #[arg(long)]
        expiry_date: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    /// Allocate a medicine to the next party, generating a tax invoice.
    Allocate {
        #[arg(long, value_enum)]
        to: TargetArg,
        #[arg(long)]
        medicine_id: Option<String>,
        #[arg(long)]
        to_address: Option<String>,
        #[arg(long)]
        to_name: Option<String>,
    },

    /// Ship a medicine to a hospital (distributor).
    Ship {
        #[arg(long)]
        medicine_id: Option<String>,
    },

    /// Record a quality check outcome (distributor).
    QualityCheck {
        #[arg(long)]
        medicine_id: Option<String>,
        /// `pass` or `fail`.
        #[arg(long)]
        passed: Option<String>,
    },

    /// Record an inventory quantity (distributor).
    ManageInventory {
        #[arg(long)]
        medicine_id: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },

    /// Upload the three supply-chain documents and verify them (hospital).
    Verify {
        #[arg(long)]
        medicine_id: Option<String>,
        #[arg(long)]
        manufacturer_document: Option<PathBuf>,
        #[arg(long)]
        wholesaler_document: Option<PathBuf>,
        #[arg(long)]
        distributor_document: Option<PathBuf>,
    },

    /// Sell a delivered medicine (hospital).
    Sell {
        #[arg(long)]
        medicine_id: Option<String>,
    },

    /// Buy a delivered medicine (patient).
    Buy {
        #[arg(long)]
        medicine_id: Option<String>,
    },

    /// Buy stock from the manufacturer (wholesaler).
    BuyFromManufacturer {
        #[arg(long)]
        medicine_id: Option<String>,
    },

    /// Show a medicine's current status.
    Track {
        #[arg(long)]
        medicine_id: Option<String>,
    },
}

impl ActionCommand {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Register { .. } => FormKind::Register,
            Self::Login { .. } => FormKind::Login,
            Self::CreateMedicine { .. } => FormKind::CreateMedicine,
            Self::Allocate { to, .. } => FormKind::Allocate((*to).into()),
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

    /// The page form these flags fill in. Document paths are read here.
    pub fn form(&self) -> Result<Form> {
        let mut form = Form::new();
        let mut set = |name: &str, value: &Option<String>| {
            if let Some(v) = value {
                form.set(name, v.as_str());
            }
        };
        match self {
            Self::Register {
                name,
                username,
                role,
                company_name,
                license_number,
                password,
            } => {
                set("name", name);
                set("username", username);
                set("role", role);
                set("companyName", company_name);
                set("licenseNumber", license_number);
                set("password", password);
            }
            Self::Login { username, password } => {
                set("username", username);
                set("password", password);
            }
            Self::CreateMedicine {
                prefix,
                name,
                composition,
                description,
                manufacturer_date,
                expiry_date,
                price,
            } => {
                set("prefix", prefix);
                set("name", name);
                set("composition", composition);
                set("description", description);
                set("manufacturerDate", manufacturer_date);
                set("expiryDate", expiry_date);
                set("price", price);
            }
            Self::Allocate {
                medicine_id,
                to_address,
                to_name,
                ..
            } => {
                set("medicineId", medicine_id);
                set("toAddress", to_address);
                set("toName", to_name);
            }
            Self::QualityCheck { medicine_id, passed } => {
                set("medicineId", medicine_id);
                set("passed", passed);
            }
            Self::ManageInventory { medicine_id, quantity } => {
                set("medicineId", medicine_id);
                set("quantity", quantity);
            }
            Self::Verify {
                medicine_id,
                manufacturer_document,
                wholesaler_document,
                distributor_document,
            } => {
                set("medicineId", medicine_id);
                let paths = [manufacturer_document, wholesaler_document, distributor_document];
                for (name, path) in VERIFY_DOCUMENTS.iter().zip(paths) {
                    if let Some(path) = path {
                        form.attach(*name, read_document(path)?);
                    }
                }
            }
            Self::Ship { medicine_id }
            | Self::Sell { medicine_id }
            | Self::Buy { medicine_id }
            | Self::BuyFromManufacturer { medicine_id }
            | Self::Track { medicine_id } => set("medicineId", medicine_id),
        }
        Ok(form)
    }
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading document {}", path.display()))
}

/// Submit the action once and print the resulting view.
pub async fn run_action(command: &ActionCommand, page: Page, opts: &OutputOptions) -> Result<u8> {
    let kind = command.kind();
    let form = command.form()?;
    tracing::debug!(form = %kind, route = %kind.route(), "submitting");

    let trigger = Trigger::new(Orchestrator::new(page, kind));
    trigger.with_view(|view| *view.form_mut() = form).await;
    let outcome = trigger.fire().await;

    let (text, qr) = trigger
        .with_view(|view| {
            let text = if opts.json {
                render_view_json(outcome, view)
            } else {
                Ok(render_view(view))
            };
            (text, view.qr_payload().map(str::to_string))
        })
        .await;
    print!("{}", text?);

    if let (Some(payload), Some(path)) = (qr, &opts.qr_out) {
        write_qr(&payload, path)?;
        if !opts.json {
            println!("  QR code: {}", path.display());
        }
    }

    Ok(exit_code(outcome))
}

fn write_qr(payload: &str, path: &Path) -> Result<()> {
    let svg = render_qr_svg(payload)?;
    std::fs::write(path, svg).with_context(|| format!("writing QR code to {}", path.display()))
}

pub fn exit_code(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Settled => EXIT_OK,
        Outcome::Failed(_) => EXIT_FAILED,
        Outcome::Rejected(_) => EXIT_REJECTED,
    }
}
