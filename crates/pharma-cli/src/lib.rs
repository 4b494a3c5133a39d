//! # pharma-cli -- Terminal front end
//!
//! Provides the `pharma` command. Each page of the front end maps to a
//! subcommand: one per form action, plus the role dashboards and the
//! read-only listings they draw from.
//!
//! ```bash
//! pharma login --username acme --password ...
//! pharma allocate --to wholesaler --medicine-id 7 --to-address 0x... --to-name Acme
//! pharma dashboard patient
//! ```
//!
//! Every action runs through the workflow orchestrator, so validation,
//! the one-prompt wallet session, and the status message are identical to
//! the browser pages.

pub mod action;
pub mod context;
pub mod dashboard;
pub mod render;

/// Exit status for a settled action or a successful listing.
pub const EXIT_OK: u8 = 0;
/// Exit status when a remote step failed.
pub const EXIT_FAILED: u8 = 1;
/// Exit status when the form was rejected before any remote call.
pub const EXIT_REJECTED: u8 = 2;
