//! Sleep-session log with incremental list reconciliation and one-shot
//! navigation signals.
//!
//! # Examples
//!
//! Diffing successive log snapshots with [`engine::diff::reconcile`]:
//! ```
//! use nightlog::{
//!     engine::{
//!         diff::{ListOp, reconcile},
//!         rows::with_header,
//!     },
//!     night::SleepNight,
//!     types::Quality,
//! };
//!
//! let night = SleepNight {
//!     id: 1,
//!     start_ms: 10,
//!     end_ms: 10,
//!     quality: Quality::Unrated,
//! };
//! let old = with_header(std::slice::from_ref(&night));
//! let rated = SleepNight {
//!     end_ms: 20,
//!     quality: Quality::Okay,
//!     ..night
//! };
//! let new = with_header(&[rated]);
//!
//! // Same identity, changed content: one in-place update, nothing rebuilt.
//! assert_eq!(reconcile(&old, &new), vec![ListOp::Update { index: 1 }]);
//! ```
//!
//! Runtime usage with the SQLite DAO:
//! ```no_run
//! use nightlog::{
//!     persist::sqlite::SqliteNightDao,
//!     runtime::handle::{RuntimeConfig, spawn_tracker},
//!     types::Quality,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let dao = SqliteNightDao::open("sleep.db").expect("open sqlite");
//! let handle = spawn_tracker(Some(Box::new(dao)), RuntimeConfig::default());
//!
//! let id = handle
//!     .start_tracking()
//!     .await
//!     .expect("start")
//!     .expect("new night");
//! let _ = handle.stop_tracking().await.expect("stop");
//! let quality_nav = handle.signals().to_quality.consume();
//! assert_eq!(quality_nav, Some(id));
//! handle.set_quality(id, Quality::Okay).await.expect("rate");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Authoritative in-memory store.
pub mod core;
/// List reconciliation: keyed diff and display rows.
pub mod engine;
/// Derived text for rendered rows.
pub mod format;
/// Sleep-night domain records and patches.
pub mod night;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// One-shot navigation signal primitive and the app's signal bundle.
pub mod signal;
/// Shared primitive types and enums.
pub mod types;
