//! # tcodes Architecture
//!
//! tcodes keeps a catalog of SAP transaction codes: an immutable reference
//! dataset shipped with the program, overlaid with what the user owns
//! (custom entries, favorites, preferences). The library is the product;
//! the `tcodes` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs, print.rs)                           │
//! │  - Parses arguments, formats output, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Lifecycle: Uninitialized → Loading → Ready ⇄ Refreshing  │
//! │  - Keeps the last good merged view for queries              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs), merge.rs, query.rs, snapshot.rs  │
//! │  - Business rules: collisions, cascades, import validation  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - EntryStore + FavoriteStore traits                        │
//! │  - SqliteStore (production), InMemoryStore (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge, Don't Mutate
//!
//! The reference catalog is never written. Custom entries and favorites live
//! in the store, and the visible catalog is recomputed from the three inputs
//! after every write (see [`merge`]). Favorites are a weak reference by code,
//! so reference entries can be favorited and a favorite for a deleted code
//! simply disappears from the view.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code returns Rust types and never prints or exits.
//! Logging goes through `tracing`; installing a subscriber is the client's
//! job.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryStore` and `StoreFixture`.
//! 2. **Storage**: `SqliteStore` and schema migrations against in-memory and
//!    temp-dir databases.
//! 3. **API**: lifecycle and dispatch.
//! 4. **CLI**: `tests/cli.rs` drives the binary with `TCODES_HOME` set.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Storage traits, SQLite backend, schema migrations
//! - [`merge`]: Reference + custom + favorites into one view
//! - [`query`]: Search, tag filters, sorting, tag counts
//! - [`reference`]: Loading the reference dataset
//! - [`settings`]: User preferences and copy behavior
//! - [`snapshot`]: Import/export document and its validation
//! - [`model`]: Core data types
//! - [`tags`]: Tag vocabulary and validation
//! - [`init`]: Locating data and wiring a production catalog
//! - [`clipboard`]: Cross-platform clipboard support
//! - [`error`]: Error types

pub mod api;
pub mod clipboard;
pub mod commands;
pub mod error;
pub mod init;
pub mod merge;
pub mod model;
pub mod query;
pub mod reference;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod tags;
