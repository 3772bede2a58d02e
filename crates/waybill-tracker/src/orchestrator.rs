//! Batch orchestrator: fan the race coordinator out across one request's
//! tracking numbers and stream each result to the delivery sink.
//!
//! Results are delivered as soon as each number's race resolves; ordering
//! across tracking numbers is whichever resolves first. The request-level
//! cancellation scope is the only boundary the races share.

use crate::error::Result;
use crate::provider::TrackingProvider;
use crate::race::{self, RaceOutcome};
use crate::sink::DeliverySink;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;
use waybill_core::{ClientId, TrackingConfig, TrackingNumber};

/// What a batch run did, for callers and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Tracking numbers in the inbound request (including invalid/duplicate)
    pub requested: usize,
    /// Races actually launched after validation and deduplication
    pub raced: usize,
    /// Deliveries fired before the scope ended
    pub delivered: usize,
}

/// Orchestrates tracking lookups across providers for client requests.
pub struct TrackingOrchestrator {
    providers: Vec<Arc<dyn TrackingProvider>>,
    log_race_launches: bool,
}

impl TrackingOrchestrator {
    /// Create an orchestrator with no providers configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            log_race_launches: TrackingConfig::default().log_provider_launches,
        }
    }

    /// Add a provider. List order only affects launch sequence, never
    /// winner selection.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TrackingProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Apply the `[tracking]` configuration section.
    #[must_use]
    pub fn with_tracking_config(mut self, config: &TrackingConfig) -> Self {
        self.log_race_launches = config.log_provider_launches;
        self
    }

    /// The configured providers.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn TrackingProvider>] {
        &self.providers
    }

    /// Run one client request: race every tracking number concurrently and
    /// deliver each result to `sink` exactly once as it resolves.
    ///
    /// Invalid input (blank client id, empty number list) is rejected as a
    /// logged no-op with no side effects. Returns once every number has been
    /// delivered or the parent scope is cancelled; on cancellation the
    /// outstanding races are abandoned and their providers observe the
    /// cascade through their own handles.
    pub async fn run_batch(
        &self,
        client_id: &str,
        tracking_numbers: &[String],
        sink: Arc<dyn DeliverySink>,
        parent: &CancellationToken,
    ) -> Result<BatchSummary> {
        let requested = tracking_numbers.len();

        let client_id = match ClientId::new(client_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting tracking request: invalid client ID");
                return Ok(BatchSummary {
                    requested,
                    ..BatchSummary::default()
                });
            }
        };

        if tracking_numbers.is_empty() {
            tracing::warn!(client_id = %client_id, "rejecting tracking request: no tracking numbers");
            return Ok(BatchSummary::default());
        }

        let numbers = Self::validate_numbers(tracking_numbers);
        if numbers.is_empty() {
            tracing::warn!(
                client_id = %client_id,
                "rejecting tracking request: no valid tracking numbers"
            );
            return Ok(BatchSummary {
                requested,
                ..BatchSummary::default()
            });
        }

        if self.providers.is_empty() {
            tracing::warn!(client_id = %client_id, "no providers configured, all results will be empty");
        }

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "tracking_batch",
            client_id = %client_id,
            request_id = %request_id,
        );

        let raced = numbers.len();
        let delivered = self
            .run_races(numbers, sink, parent)
            .instrument(span)
            .await;

        Ok(BatchSummary {
            requested,
            raced,
            delivered,
        })
    }

    /// Trim, validate, and deduplicate the requested numbers, preserving
    /// first-occurrence order.
    fn validate_numbers(tracking_numbers: &[String]) -> Vec<TrackingNumber> {
        let mut seen = HashSet::new();
        let mut numbers = Vec::new();
        for raw in tracking_numbers {
            match TrackingNumber::new(raw.as_str()) {
                Ok(number) => {
                    if seen.insert(number.clone()) {
                        numbers.push(number);
                    }
                }
                Err(e) => {
                    tracing::warn!(raw = %raw, error = %e, "skipping invalid tracking number");
                }
            }
        }
        numbers
    }

    async fn run_races(
        &self,
        numbers: Vec<TrackingNumber>,
        sink: Arc<dyn DeliverySink>,
        parent: &CancellationToken,
    ) -> usize {
        tracing::info!(count = numbers.len(), "starting tracking races");

        let mut races = FuturesUnordered::new();
        for number in numbers {
            let providers = self.providers.clone();
            let sink = Arc::clone(&sink);
            let parent = parent.clone();
            let log_launch = self.log_race_launches;
            races.push(async move {
                if log_launch {
                    tracing::info!(
                        tracking_number = %number,
                        providers = providers.len(),
                        "launching provider race"
                    );
                } else {
                    tracing::debug!(
                        tracking_number = %number,
                        providers = providers.len(),
                        "launching provider race"
                    );
                }
                let outcome = race::race_providers(&number, &providers, &parent).await;

                if parent.is_cancelled() {
                    tracing::debug!(tracking_number = %number, "scope cancelled, skipping delivery");
                    return false;
                }

                let records = match outcome {
                    RaceOutcome::Resolved(records) => records,
                    RaceOutcome::Empty => Vec::new(),
                };
                tracing::info!(
                    tracking_number = %number,
                    count = records.len(),
                    "delivering result"
                );
                if let Err(e) = sink.notify(&number, records).await {
                    // A broken sink never aborts sibling deliveries
                    tracing::warn!(tracking_number = %number, error = %e, "delivery sink failed");
                }
                true
            });
        }

        let mut delivered = 0;
        loop {
            tokio::select! {
                () = parent.cancelled() => {
                    tracing::debug!("request scope cancelled, abandoning outstanding races");
                    break;
                }
                next = races.next() => match next {
                    Some(did_deliver) => {
                        if did_deliver {
                            delivered += 1;
                        }
                    }
                    None => break,
                },
            }
        }

        tracing::info!(delivered, "tracking batch finished");
        delivered
    }
}

impl Default for TrackingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
