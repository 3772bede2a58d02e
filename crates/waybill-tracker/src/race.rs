//! Race coordinator: first provider to detect a match wins.
//!
//! For one tracking number, every provider is launched concurrently with its
//! own cancellation handle derived from the request scope. The first lookup
//! to report `Found` is declared the winner, its siblings are cancelled
//! immediately, and only the winner's deferred extraction ever runs. The
//! race resolves to exactly one [`RaceOutcome`] no matter how providers
//! finish, fail, or get cancelled.

use crate::provider::{ProviderOutcome, ResultProducer, TrackingProvider};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use waybill_core::{sort_newest_first, StatusRecord, TrackingNumber};

/// The single result of racing all providers for one tracking number.
///
/// `Empty` covers "no provider found a match", "every provider failed", and
/// "the winner's extraction produced nothing" alike; callers that need to
/// tell those apart must rely on logs, not this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// The winning provider produced records, sorted newest-first
    Resolved(Vec<StatusRecord>),
    /// No records for this tracking number
    Empty,
}

/// Race all providers for one tracking number.
///
/// Winner selection is by *detection* order (lookup completion), not list
/// order and not extraction completion: detection is cheap, extraction can
/// be slow, and only one extraction should ever run.
///
/// Cancelling `parent` before a winner is declared resolves the race to
/// `Empty` and cascades to every provider's handle; cancellation is a
/// termination path, not an error.
///
/// Every per-provider handle has fired by the time the race resolves, the
/// winner's included, so resources scoped to an attempt's handle (watchers,
/// sessions) are reclaimed without waiting for the request scope to end.
pub async fn race_providers(
    tracking_number: &TrackingNumber,
    providers: &[Arc<dyn TrackingProvider>],
    parent: &CancellationToken,
) -> RaceOutcome {
    if providers.is_empty() || parent.is_cancelled() {
        return RaceOutcome::Empty;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut children = Vec::with_capacity(providers.len());

    for (idx, provider) in providers.iter().enumerate() {
        let child = parent.child_token();
        children.push(child.clone());

        let provider = Arc::clone(provider);
        let number = tracking_number.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            tracing::debug!(
                provider = provider.provider_id(),
                tracking_number = %number,
                "starting provider lookup"
            );
            let outcome = provider.lookup(&number, child).await;
            // The receiver is gone once a winner is declared; losers' reports
            // are dropped on the floor.
            let _ = tx.send((idx, provider.provider_id().to_string(), outcome));
        });
    }
    drop(tx);

    let mut remaining = providers.len();
    loop {
        let report = tokio::select! {
            () = parent.cancelled() => {
                tracing::debug!(tracking_number = %tracking_number, "race cancelled by request scope");
                cancel_all(&children);
                return RaceOutcome::Empty;
            }
            report = rx.recv() => report,
        };

        let Some((idx, provider_id, outcome)) = report else {
            // All lookup tasks are gone without a winner
            cancel_all(&children);
            return RaceOutcome::Empty;
        };

        match outcome {
            Ok(ProviderOutcome::Found(producer)) => {
                tracing::debug!(
                    provider = %provider_id,
                    tracking_number = %tracking_number,
                    "winner declared, cancelling sibling providers"
                );
                for (i, child) in children.iter().enumerate() {
                    if i != idx {
                        child.cancel();
                    }
                }
                drop(rx);
                let outcome = extract(tracking_number, &provider_id, producer, parent).await;
                // The attempt is over; fire the winner's handle too so
                // anything scoped to it (session watchers) unwinds.
                cancel_all(&children);
                return outcome;
            }
            Ok(ProviderOutcome::NoMatch) => {
                tracing::debug!(
                    provider = %provider_id,
                    tracking_number = %tracking_number,
                    "provider reported no match"
                );
            }
            Err(e) => {
                // Contained at the provider boundary: logged, treated as no-match,
                // never aborts sibling providers.
                tracing::warn!(
                    provider = %provider_id,
                    tracking_number = %tracking_number,
                    error = %e,
                    "provider lookup failed"
                );
            }
        }

        remaining -= 1;
        if remaining == 0 {
            cancel_all(&children);
            return RaceOutcome::Empty;
        }
    }
}

/// Run the winner's deferred extraction exactly once.
///
/// A producer failure maps to `Empty` with no fallback: the race already
/// consumed the other providers' capacity by cancelling them.
async fn extract(
    tracking_number: &TrackingNumber,
    provider_id: &str,
    producer: ResultProducer,
    parent: &CancellationToken,
) -> RaceOutcome {
    let result = tokio::select! {
        () = parent.cancelled() => {
            tracing::debug!(
                provider = %provider_id,
                tracking_number = %tracking_number,
                "request scope cancelled during extraction"
            );
            return RaceOutcome::Empty;
        }
        result = producer => result,
    };

    match result {
        Ok(records) if records.is_empty() => {
            tracing::debug!(
                provider = %provider_id,
                tracking_number = %tracking_number,
                "winner extracted no records"
            );
            RaceOutcome::Empty
        }
        Ok(mut records) => {
            sort_newest_first(&mut records);
            tracing::debug!(
                provider = %provider_id,
                tracking_number = %tracking_number,
                count = records.len(),
                "winner extracted records"
            );
            RaceOutcome::Resolved(records)
        }
        Err(e) => {
            tracing::warn!(
                provider = %provider_id,
                tracking_number = %tracking_number,
                error = %e,
                "winning producer failed"
            );
            RaceOutcome::Empty
        }
    }
}

fn cancel_all(children: &[CancellationToken]) {
    for child in children {
        child.cancel();
    }
}
