//! # Lost & Found
//!
//! **A lost-and-found listing backend with automatic lost/found matching.**
//!
//! Users post reports of items they have lost or found. Each new report is
//! compared against earlier reports of the opposite status and the same
//! item type; plausible matches produce notifications for both owners.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//! │  CLI / HTTP  │──▶│   Posting    │──▶│ ReportStore │
//! │  (lf, axum)  │   │   pipeline   │   │ JSON/memory │
//! └──────────────┘   └──────┬───────┘   └────────────┘
//!                           │
//!                ┌──────────┴──────────┐
//!                ▼                     ▼
//!          ┌──────────┐          ┌──────────┐
//!          │ Matcher  │          │ Notifier │
//!          │  (core)  │          │  badges  │
//!          └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lf post --owner alice --status lost --type wallet \
//!     --name "black leather wallet" --location "Main Street Park" \
//!     --description "lost my leather wallet" --date 2024-05-08
//! lf notifications --owner alice
//! lf serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`json_store`] | File-backed `ReportStore` |
//! | [`report`] | Posting pipeline and match preview |
//! | [`notify`] | Per-user unread-count feeds and subscription handles |
//! | [`profile`] | A user's reports and notifications |
//! | [`server`] | JSON HTTP API (Axum) with CORS |
//!
//! Matching itself lives in the `lostfound-core` crate.

pub mod config;
pub mod json_store;
pub mod logging;
pub mod notify;
pub mod profile;
pub mod report;
pub mod server;

pub use lostfound_core::models::{ItemReport, MatchResult, Notification, Status};
pub use notify::{Notifier, Subscription};
