//! # Dashboards and Listings
//!
//! Read-only pages. These bypass the orchestrator's state machine and
//! never write.
//!
//! | Dashboard | Shows |
//! |-----------|-------|
//! | manufacturer | full catalogue and registered wholesalers |
//! | wholesaler, distributor, hospital | medicines allocated to the account |
//! | patient | purchased or delivered medicines |

use anyhow::Result;
use clap::{Args, ValueEnum};

use pharma_core::{Role, Route};
use pharma_workflow::dashboard::{patient_visible, purchasable, shippable};
use pharma_workflow::{FormKind, Page};

use crate::context::OutputOptions;
use crate::render::{render_allocated, render_catalogue, render_users, to_json};
use crate::EXIT_OK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Manufacturer,
    Wholesaler,
    Distributor,
    Hospital,
    Patient,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Manufacturer => Role::Manufacturer,
            RoleArg::Wholesaler => Role::Wholesaler,
            RoleArg::Distributor => Role::Distributor,
            RoleArg::Hospital => Role::Hospital,
            RoleArg::Patient => Role::Patient,
        }
    }
}

/// Arguments for `pharma dashboard`.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[arg(value_enum)]
    pub role: RoleArg,
}

/// Which records `pharma catalogue` lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CatalogueFilter {
    #[default]
    All,
    /// Purchased or delivered.
    Patient,
    /// Delivered and available to buy.
    Purchasable,
    /// Quality checked or in transit.
    Shippable,
}

/// Arguments for `pharma catalogue`.
#[derive(Args, Debug)]
pub struct CatalogueArgs {
    #[arg(long, value_enum, default_value = "all")]
    pub filter: CatalogueFilter,
}

/// Arguments for `pharma users`.
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[arg(long, value_enum)]
    pub role: RoleArg,
}

pub async fn run_dashboard(args: &DashboardArgs, page: &Page, opts: &OutputOptions) -> Result<u8> {
    match args.role {
        RoleArg::Manufacturer => {
            run_catalogue(&CatalogueArgs { filter: CatalogueFilter::All }, page, opts).await?;
            run_users(&UsersArgs { role: RoleArg::Wholesaler }, page, opts).await
        }
        RoleArg::Patient => run_catalogue(&CatalogueArgs { filter: CatalogueFilter::Patient }, page, opts).await,
        RoleArg::Wholesaler | RoleArg::Distributor | RoleArg::Hospital => {
            let rows = page.allocated_to_me().await?;
            if opts.json {
                println!("{}", to_json(&rows)?);
            } else {
                print!("{}", render_allocated(&rows));
            }
            Ok(EXIT_OK)
        }
    }
}

pub async fn run_catalogue(args: &CatalogueArgs, page: &Page, opts: &OutputOptions) -> Result<u8> {
    let records = page.catalogue().await?;
    let (title, selected) = match args.filter {
        CatalogueFilter::All => ("Medicines", records.iter().collect::<Vec<_>>()),
        CatalogueFilter::Patient => ("Patient medicines", patient_visible(&records)),
        CatalogueFilter::Purchasable => ("Available to buy", purchasable(&records)),
        CatalogueFilter::Shippable => ("Ready to ship", shippable(&records)),
    };
    if opts.json {
        println!("{}", to_json(&selected)?);
    } else {
        print!("{}", render_catalogue(title, &selected));
    }
    Ok(EXIT_OK)
}

pub async fn run_users(args: &UsersArgs, page: &Page, opts: &OutputOptions) -> Result<u8> {
    let role: Role = args.role.into();
    let users = page.users_with_role(role).await?;
    if opts.json {
        println!("{}", to_json(&users)?);
    } else {
        print!("{}", render_users(&format!("Registered {role}s"), &users));
    }
    Ok(EXIT_OK)
}

/// Every route with the forms it hosts.
pub fn route_table() -> String {
    let mut out = String::new();
    for route in Route::ALL {
        let forms: Vec<&str> = FormKind::ALL
            .iter()
            .filter(|k| k.route() == route)
            .map(|k| k.name())
            .collect();
        if forms.is_empty() {
            out.push_str(&format!("{route}\n"));
        } else {
            out.push_str(&format!("{route}  {}\n", forms.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_args_cover_every_role() {
        for arg in RoleArg::value_variants() {
            let role: Role = (*arg).into();
            assert!(Role::ALL.contains(&role));
        }
        assert_eq!(RoleArg::value_variants().len(), Role::ALL.len());
    }

    #[test]
    fn route_table_lists_forms() {
        let table = route_table();
        assert!(table.contains("/allocate  allocate-wholesaler, allocate-distributor, allocate-hospital"));
        assert!(table.lines().any(|l| l == "/"));
        assert_eq!(table.lines().count(), Route::ALL.len());
    }
}
