//! uxaudit core library.
//!
//! This crate exposes programmatic APIs for validating rendered pages
//! against route, responsive, accessibility, performance, consistency,
//! interaction, and stakeholder rules.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `dom`: The `RenderContext` capability rules read through, and a flat
//!   document index.
//! - `rules`: Rule implementations.
//! - `validate`: Aggregator, report builder, and filters.
//! - `session`: Debounced validator state machine bound to a page lifecycle.
//! - `widget`: Terminal presentation of a session's issues.
//! - `scan`: Parallel runner over snapshot files.
//! - `watch`: Interactive stdin host for a session.
//! - `models`: Issues, reports, snapshots, and the site map.
//! - `output`: Human/JSON printers.
//! - `error`: Load and render-context errors.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod models;
pub mod output;
pub mod rules;
pub mod scan;
pub mod session;
pub mod utils;
pub mod validate;
pub mod watch;
pub mod widget;
