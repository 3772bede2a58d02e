//! Waybill Tracker - Multi-provider race-to-first-result orchestration.
//!
//! For each tracking number in a client request, every configured provider
//! is queried concurrently; the first one to detect a match wins, the rest
//! are cancelled, and exactly one result (possibly empty) is delivered to
//! the caller-supplied sink - under client cancellation, provider failure,
//! and partial success alike.
//!
//! # Features
//!
//! - Race coordinator with first-detection-wins tie-breaking and
//!   cooperative sibling cancellation
//! - Batch orchestration with streamed, exactly-once delivery per number
//! - Per-client request registry where a new request supersedes the old one
//! - Provider and delivery-sink capability traits at the external seams
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waybill_tracker::{ClientRegistry, TrackingOrchestrator};
//!
//! let orchestrator = TrackingOrchestrator::new()
//!     .with_provider(Arc::new(guilbault))
//!     .with_provider(Arc::new(minimax));
//!
//! let registry = ClientRegistry::new();
//! let scope = registry.register(&client_id).await;
//! orchestrator
//!     .run_batch("client-1", &numbers, sink, scope.token())
//!     .await?;
//! registry.release(&scope).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod race;
pub mod registry;
pub mod sink;
pub mod status;

// Re-export commonly used types
pub use error::{Result, TrackError};
pub use orchestrator::{BatchSummary, TrackingOrchestrator};
pub use provider::{ProviderOutcome, ResultProducer, TrackingProvider};
pub use race::{race_providers, RaceOutcome};
pub use registry::{ActiveScope, ClientRegistry};
pub use sink::DeliverySink;
pub use status::{probe, ServiceStatus};
