//! Hatlink Common Library
//!
//! This crate provides shared constants, configuration loading, error types
//! and the driver boundary traits for all hatlink workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Device type ids, settling parameters, event thresholds
//! - [`config`] - Configuration loading traits and per-device configs
//! - [`error`] - Device-layer and driver-boundary error types
//! - [`types`] - Sample tuple, port identifiers, report-channel flags
//! - [`driver`] - Traits consumed from the low-level transport
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use hatlink_common::prelude::*;
//!
//! assert_eq!(SETTLE_WINDOW, 5);
//! ```

pub mod config;
pub mod consts;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod types;
