//! The delivery sink contract: how a resolved result reaches a client.

use crate::error::Result;
use async_trait::async_trait;
use waybill_core::{StatusRecord, TrackingNumber};

/// Caller-supplied notifier invoked exactly once per tracking number per
/// request with that number's resolved records (possibly empty).
///
/// The orchestrator guards the exactly-once property; implementations own no
/// race state of their own but should still tolerate being cheap to call.
/// Failures are logged and ignored by the orchestrator, so a broken sink
/// never aborts sibling deliveries.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Deliver the final records for one tracking number.
    ///
    /// Records arrive sorted newest-first. An empty list means no provider
    /// produced data, which is indistinguishable from "confirmed no record"
    /// by design.
    async fn notify(
        &self,
        tracking_number: &TrackingNumber,
        records: Vec<StatusRecord>,
    ) -> Result<()>;
}
