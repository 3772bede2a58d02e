//! Browser session lifecycle guard for tracking providers.
//!
//! Wraps the open-use-close lifecycle of the remote browsing session a
//! provider lookup holds, so release runs exactly once on every exit path:
//! normal completion, error, and cooperative cancellation.

pub mod actions;
pub mod error;
pub mod session;

pub use actions::{extract_domain, SessionActions};
pub use error::{BrowserError, Result};
pub use session::BrowserSession;
