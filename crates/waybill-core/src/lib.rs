//! Waybill Core - Foundation crate for the Waybill tracking service.
//!
//! This crate provides shared types, error handling, and configuration
//! management that all other Waybill crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and the status record value type
//!   (`TrackingNumber`, `ClientId`, `Timestamp`, `StatusRecord`)
//!
//! # Example
//!
//! ```rust
//! use waybill_core::{StatusRecord, Timestamp, TrackingNumber};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let number = TrackingNumber::new("PTL-100042")?;
//! let record = StatusRecord::new(Timestamp::now(), "Picked up", false)
//!     .with_location("Montreal, QC");
//! println!("{number}: {}", record.status);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserSettings, GeneralConfig, TrackingConfig};
pub use error::{ConfigError, ConfigResult, Result, WaybillError};
pub use types::{sort_newest_first, ClientId, StatusRecord, Timestamp, TrackingNumber};
