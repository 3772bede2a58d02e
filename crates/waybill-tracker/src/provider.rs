//! The tracking provider contract the race coordinator consumes.
//!
//! A provider is an independent external data source (typically a carrier
//! site driven through a browser session) that can look up a tracking number.
//! Lookup resolves as soon as the provider *detects* a match; the actual
//! record extraction is deferred behind a [`ResultProducer`] so that only the
//! race winner ever pays for it.

use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use waybill_core::{StatusRecord, TrackingNumber};

/// Deferred extraction of the status records a provider detected.
///
/// Consumed on invocation, so it runs at most once. The coordinator invokes
/// the declared winner's producer and discards every other one.
pub type ResultProducer = BoxFuture<'static, Result<Vec<StatusRecord>>>;

/// What a provider lookup resolved to.
///
/// "Not found" is an expected condition signalled as [`NoMatch`], never as an
/// error; errors are reserved for genuine failures (navigation broke, session
/// died), which the coordinator contains and treats as no-match anyway.
///
/// [`NoMatch`]: ProviderOutcome::NoMatch
pub enum ProviderOutcome {
    /// The provider found nothing to deliver for this tracking number
    NoMatch,
    /// The provider detected a match and can extract records on demand
    Found(ResultProducer),
}

impl ProviderOutcome {
    /// Wrap a future as the deferred extraction of a `Found` outcome.
    pub fn found<F>(producer: F) -> Self
    where
        F: Future<Output = Result<Vec<StatusRecord>>> + Send + 'static,
    {
        Self::Found(Box::pin(producer))
    }

    /// Whether this outcome is a match.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl fmt::Debug for ProviderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "NoMatch"),
            Self::Found(_) => write!(f, "Found(..)"),
        }
    }
}

/// Capability interface for one external tracking data source.
///
/// Implementations must be safe to run concurrently with other providers for
/// the same tracking number, must observe `cancel` promptly (releasing any
/// session resource even mid-extraction, see
/// `waybill_browser::BrowserSession::close_on_cancel`), and must not assume
/// the returned producer is ever invoked.
#[async_trait]
pub trait TrackingProvider: Send + Sync {
    /// Look up a tracking number.
    ///
    /// Resolves at detection time: a `Found` outcome means the provider knows
    /// records exist, not that it has extracted them yet.
    ///
    /// # Errors
    /// Returns error only for unexpected failures; "no record for this
    /// number" is `Ok(ProviderOutcome::NoMatch)`.
    async fn lookup(
        &self,
        tracking_number: &TrackingNumber,
        cancel: CancellationToken,
    ) -> Result<ProviderOutcome>;

    /// Stable identifier for this provider, used in log context.
    fn provider_id(&self) -> &str;
}
