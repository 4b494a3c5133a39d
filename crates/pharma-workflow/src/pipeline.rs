//! Per-action submitting sequences.
//!
//! Each sequence is strictly ordered: read, then render, then upload, then
//! write. Every step consumes the previous step's output. Nothing that
//! already ran is undone when a later step fails. An uploaded document
//! that no write ever references is abandoned.

use pharma_client::contract::MEDICINE_CREATED;
use pharma_client::records::{decode_bool, decode_uint, MedicineCreated};
use pharma_client::{AllocationTarget, Call, ContractBinding, Medicine, Session};
use pharma_core::{route_for_role_code, MedicineId, MedicineStatus};
use pharma_invoice::{qr_payload, record_fields, Fields, LayoutKind};

use crate::actions::{Action, Credentials, Registration};
use crate::error::WorkflowError;
use crate::page::Page;
use crate::view::Settlement;

pub(crate) async fn execute(
    page: &Page,
    session: &Session,
    binding: &ContractBinding,
    action: Action,
) -> Result<Settlement, WorkflowError> {
    match action {
        Action::Register(reg) => register(page, session, binding, reg).await,
        Action::Login(creds) => login(page, session, binding, creds).await,
        Action::CreateMedicine(medicine) => {
            let fields = record_fields(&medicine.metadata(&session.account))?;
            let bytes = page.renderer().render(LayoutKind::Metadata, &fields)?;
            let cid = page.upload(bytes).await?;

            let call = Call::create_medicine(&medicine, &cid)?;
            let receipt = page.write(binding, call, session, None).await?;
            let event = receipt
                .event(&MEDICINE_CREATED)
                .ok_or_else(|| WorkflowError::MalformedResponse("MedicineCreated event not found".to_string()))?;
            let created = MedicineCreated::from_returned(&event.values)?;

            let record = read_medicine(page, binding, Call::medicines(&created.id)?, "medicines").await?;
            Ok(Settlement {
                message: format!("Medicine {} created with ID {}", record.name, record.id),
                transaction: Some(receipt.transaction_id),
                document_link: Some(page.retrieval_link(&cid)),
                content: Some(cid),
                qr_payload: Some(qr_payload(&record)?),
                record: Some(record),
                ..Settlement::default()
            })
        }
        Action::Allocate {
            target,
            id,
            to,
            to_name,
        } => {
            let record = read_medicine(page, binding, Call::medicines(&id)?, "medicines").await?;
            let fields = invoice_fields(page, session, target, &record, &to, &to_name);
            let bytes = page.renderer().render(LayoutKind::TaxInvoice, &fields)?;
            let cid = page.upload(bytes).await?;

            let call = Call::allocate(target, &id, &to, &cid)?;
            let receipt = page.write(binding, call, session, None).await?;
            Ok(Settlement {
                message: format!("Medicine allocated to {to_name} successfully!"),
                transaction: Some(receipt.transaction_id),
                document_link: Some(page.retrieval_link(&cid)),
                content: Some(cid),
                ..Settlement::default()
            })
        }
        Action::Ship { id } => {
            let receipt = page
                .write(binding, Call::ship_medicine_to_hospital(&id)?, session, None)
                .await?;
            Ok(Settlement {
                transaction: Some(receipt.transaction_id),
                ..Settlement::message("Medicine shipped successfully!")
            })
        }
        Action::QualityCheck { id, passed } => {
            let receipt = page
                .write(binding, Call::perform_quality_check(&id, passed)?, session, None)
                .await?;
            let outcome = if passed { "passed" } else { "failed" };
            Ok(Settlement {
                message: format!("Quality check {outcome} for medicine {id}"),
                transaction: Some(receipt.transaction_id),
                status: Some((id, MedicineStatus::after_quality_check(passed))),
                ..Settlement::default()
            })
        }
        Action::ManageInventory { id, quantity } => {
            let note = format!("Medicine ID: {id}, Quantity: {quantity}");
            let cid = page.upload(note.into_bytes()).await?;
            let receipt = page
                .write(binding, Call::manage_inventory(&id, quantity, &cid)?, session, None)
                .await?;
            Ok(Settlement {
                message: format!("Inventory managed successfully for medicine ID {id}"),
                transaction: Some(receipt.transaction_id),
                document_link: Some(page.retrieval_link(&cid)),
                content: Some(cid),
                ..Settlement::default()
            })
        }
        Action::Verify { id, documents } => {
            let [manufacturer, wholesaler, distributor] = documents;
            let hashes = [
                page.upload(manufacturer).await?,
                page.upload(wholesaler).await?,
                page.upload(distributor).await?,
            ];
            let receipt = page
                .write(binding, Call::verify_ipfs_hashes(&id, &hashes)?, session, None)
                .await?;

            let record = read_medicine(page, binding, Call::get_medicine_by_id(&id)?, "getMedicineById").await?;
            let message = if record.is_expired(page.clock().now()) == Some(true) {
                "Medicine has expired!"
            } else {
                "IPFS hashes verified successfully!"
            };
            Ok(Settlement {
                transaction: Some(receipt.transaction_id),
                record: Some(record),
                ..Settlement::message(message)
            })
        }
        Action::Sell { id } => {
            let value = Some(page.settings().purchase_value);
            let receipt = page.write(binding, Call::sell_medicine(&id)?, session, value).await?;
            Ok(Settlement {
                transaction: Some(receipt.transaction_id),
                ..Settlement::message("Medicine sold successfully!")
            })
        }
        Action::Buy { id } => {
            let record = read_medicine(page, binding, Call::medicines(&id)?, "medicines").await?;
            let value = Some(page.settings().purchase_value);
            let receipt = page.write(binding, Call::buy_medicine(&id)?, session, value).await?;
            Ok(Settlement {
                transaction: Some(receipt.transaction_id),
                qr_payload: Some(qr_payload(&record)?),
                ..Settlement::message("Medicine bought successfully! QR code link has been generated.")
            })
        }
        Action::BuyFromManufacturer { id } => {
            let receipt = page
                .write(binding, Call::buy_medicine_from_manufacturer(&id)?, session, None)
                .await?;
            Ok(Settlement {
                transaction: Some(receipt.transaction_id),
                ..Settlement::message("Medicine bought successfully!")
            })
        }
        Action::Track { id } => track(page, binding, id).await,
    }
}

async fn register(
    page: &Page,
    session: &Session,
    binding: &ContractBinding,
    reg: Registration,
) -> Result<Settlement, WorkflowError> {
    let call = Call::register_user(
        &session.account,
        &reg.name,
        &reg.username,
        reg.role,
        &reg.company_name,
        &reg.license_number,
        reg.password.expose(),
    )?;
    let receipt = page.write(binding, call, session, None).await?;
    Ok(Settlement {
        transaction: Some(receipt.transaction_id),
        ..Settlement::message("Registration successful!")
    })
}

async fn login(
    page: &Page,
    session: &Session,
    binding: &ContractBinding,
    creds: Credentials,
) -> Result<Settlement, WorkflowError> {
    let from = Some(&session.account);
    let returned = page
        .read(binding, Call::login_user(&creds.username, creds.password.expose())?, from)
        .await?;
    if !decode_bool("loginUser", &returned)? {
        return Err(WorkflowError::InvalidCredentials);
    }

    let returned = page.read(binding, Call::get_user_role(&session.account)?, from).await?;
    let code = decode_uint("getUserRole", &returned)?.to_string();
    let route = route_for_role_code(&code);
    tracing::info!(username = %creds.username, role = %code, route = %route, "login accepted");
    Ok(Settlement {
        redirect: Some(route),
        ..Settlement::message(format!("Welcome, {}", creds.username))
    })
}

async fn track(page: &Page, binding: &ContractBinding, id: MedicineId) -> Result<Settlement, WorkflowError> {
    let record = read_medicine(page, binding, Call::track_medicine(&id)?, "trackMedicine").await?;
    Ok(Settlement {
        message: format!("Medicine {} is {}", record.id, record.current_status),
        record: Some(record),
        ..Settlement::default()
    })
}

async fn read_medicine(
    page: &Page,
    binding: &ContractBinding,
    call: Call,
    method: &'static str,
) -> Result<Medicine, WorkflowError> {
    let returned = page.read(binding, call, None).await?;
    Ok(Medicine::from_returned(method, &returned)?)
}

/// Tax invoice lines for an allocation, in invoice order.
fn invoice_fields(
    page: &Page,
    session: &Session,
    target: AllocationTarget,
    record: &Medicine,
    to: &pharma_core::AccountAddress,
    to_name: &str,
) -> Fields {
    let sender = target.sender_role().to_string().to_lowercase();
    let receiver = target.receiver_role().to_string().to_lowercase();
    let today = page.clock().now().date_display();
    let mut f = Fields::new();
    f.insert(format!("{sender}Address"), session.account.to_string());
    f.insert("currentDate".into(), today);
    f.insert("medicineId".into(), record.id.to_string());
    f.insert("prefix".into(), record.prefix.clone());
    f.insert("name".into(), record.name.clone());
    f.insert("description".into(), record.description.clone());
    f.insert("manufacturerDate".into(), record.manufacturer_date.clone());
    f.insert("expiryDate".into(), record.expiry_date.clone());
    f.insert("price".into(), record.price.to_string());
    f.insert("composition".into(), record.composition.clone());
    f.insert(format!("{receiver}Address"), to.to_string());
    f.insert(format!("{receiver}Name"), to_name.to_string());
    f
}
