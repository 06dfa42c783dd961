//! Rootly - houseplant care tracking.
//!
//! # Overview
//!
//! Rootly keeps a single user's plant collection: what species each plant is,
//! when it was watered and fertilized, and a growth journal. From a species'
//! care profile and a plant's activity history it computes when the plant next
//! needs water or fertilizer.
//!
//! The scheduling and catalog logic is pure and lock-free; storage and HTTP
//! are thin layers around it.
//!
//! # Modules
//!
//! - [`model`]: Species profiles, plants, activity events and API types
//! - [`error`]: The `CareError` taxonomy
//! - [`catalog`]: Immutable species lookup
//! - [`scheduler`]: Next-due-date computation
//! - [`storage`]: SQLite storage layer
//! - [`care`]: Care summaries and to-do lists built from storage + scheduler
//! - [`seed`]: Default species and demo garden
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod care;
pub mod catalog;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod seed;
pub mod storage;
