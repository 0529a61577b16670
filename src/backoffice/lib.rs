//! # Backoffice Architecture
//!
//! Backoffice is a **UI-agnostic resource administration engine**. Given a
//! declarative description of a record type (its fields and how each one
//! takes part in search, sorting, filtering and display), it provides the
//! whole list-page workflow: search, filters, sorting, pagination, row
//! selection, create / edit / view dialogs, two-step deletion, bulk actions
//! and notifications, over any backend.
//!
//! The binary in this package is one client of the library. Nothing below the
//! CLI writes to stdout/stderr or exits the process.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders templates, terminal I/O        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator (orchestrator/)                               │
//! │  - Owns records, view state, dialogs and notices            │
//! │  - Calls the backend, reconciles only on success            │
//! └─────────────────────────────────────────────────────────────┘
//!             │                                   │
//!             ▼                                   ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │  Engine (engine/)            │   │  Presentation (present/) │
//! │  - Query pipeline            │   │  - Table / detail views  │
//! │  - Selection tracker         │   │  - Cell formatting       │
//! │  - View-state reducer        │   │  - UI intents            │
//! └──────────────────────────────┘   └──────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract ResourceOperations trait                        │
//! │  - FileResource (CLI), InMemoryResource (mock / testing)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Records
//!
//! The engine is generic over any type implementing [`model::Resource`]: a
//! stable identifier plus read access to fields by key. [`model::Record`] is
//! the schemaless implementation used by the built-in backends and the CLI.
//!
//! ## Testing Strategy
//!
//! 1. **Engine and presentation**: pure functions, tested with plain unit tests.
//! 2. **Orchestrator**: `#[tokio::test]` flows against a scriptable backend
//!    (`store::memory::fixtures`) that can fail or delay any operation.
//! 3. **CLI**: end-to-end tests in `tests/` driving the binary against a
//!    temporary data directory.
//!
//! ## Module Overview
//!
//! - [`fields`]: Field descriptors, values and filter operators
//! - [`schema`]: Resource configuration and its builder
//! - [`model`]: The `Resource` trait and the dynamic `Record`
//! - [`engine`]: Query pipeline, selection tracker, view-state reducer
//! - [`present`]: Table and detail view models, cell formatting, intents
//! - [`form`]: Create / edit forms and input validation
//! - [`dialog`]: Dialog slots and submission tickets
//! - [`orchestrator`]: The CRUD orchestrator
//! - [`notice`]: User-facing notifications
//! - [`store`]: Backend trait and implementations
//! - [`config`]: Display settings
//! - [`catalog`]: Demo resources (users, products, orders)
//! - [`error`]: Error types

pub mod catalog;
pub mod config;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod fields;
pub mod form;
pub mod model;
pub mod notice;
pub mod orchestrator;
pub mod present;
pub mod schema;
pub mod store;
