//! Core types for photocal.
//!
//! This crate provides everything the `photocal` CLI builds on:
//! - `event` / `validate` for event records and their field rules
//! - `extract` for locating the JSON payload inside free-form model output
//! - `vision` and `pipeline` for turning a photo into an event record
//! - `store` for the locally persisted event collection
//! - `controller` for the upload → review → save flow

pub mod calendar_view;
pub mod constants;
pub mod controller;
pub mod error;
pub mod event;
pub mod extract;
pub mod image;
pub mod photocal;
pub mod photocal_config;
pub mod pipeline;
pub mod store;
pub mod validate;
pub mod vision;

pub use error::{PhotocalError, PhotocalResult};
pub use event::EventRecord;
