//! # CLI Layer
//!
//! The command-line client of the library. This is the only place that:
//! - parses arguments (`setup`)
//! - reads and writes the terminal, including the delete confirmation prompt
//! - decides exit codes (via `main.rs`)
//!
//! Every command builds a [`backoffice::orchestrator::CrudOrchestrator`] over a
//! [`backoffice::store::fs::FileResource`], drives it the way an interactive
//! list page would (intents, dialogs, confirmations), then renders the
//! resulting view models through the templates in `templates/`.
//!
//! Logging goes to stderr through `tracing`; set `BACKOFFICE_LOG` (e.g.
//! `backoffice=debug`) or pass `-v`.

mod commands;
mod render;
pub mod setup;
mod styles;
mod templates;

pub use commands::run;
