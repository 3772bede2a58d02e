//! A client's new request supersedes its in-flight one end to end: the old
//! scope's providers observe cancellation once the new registration lands.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use waybill_core::{ClientId, StatusRecord, Timestamp, TrackingNumber};
use waybill_tracker::{
    ClientRegistry, DeliverySink, ProviderOutcome, TrackingOrchestrator, TrackingProvider,
};

/// Provider that never resolves on its own; it only ends via cancellation.
struct HangingProvider {
    observed_cancel: Arc<AtomicBool>,
}

#[async_trait]
impl TrackingProvider for HangingProvider {
    async fn lookup(
        &self,
        _tracking_number: &TrackingNumber,
        cancel: CancellationToken,
    ) -> waybill_tracker::Result<ProviderOutcome> {
        cancel.cancelled().await;
        self.observed_cancel.store(true, Ordering::SeqCst);
        Ok(ProviderOutcome::NoMatch)
    }

    fn provider_id(&self) -> &str {
        "hanging"
    }
}

struct CountingSink {
    deliveries: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliverySink for CountingSink {
    async fn notify(
        &self,
        tracking_number: &TrackingNumber,
        _records: Vec<StatusRecord>,
    ) -> waybill_tracker::Result<()> {
        self.deliveries
            .lock()
            .expect("sink lock")
            .push(tracking_number.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_second_request_cancels_first_requests_providers() {
    let registry = Arc::new(ClientRegistry::new());
    let client = ClientId::new("push-channel-7").expect("valid client ID");

    let observed_cancel = Arc::new(AtomicBool::new(false));
    let orchestrator = Arc::new(TrackingOrchestrator::new().with_provider(Arc::new(
        HangingProvider {
            observed_cancel: Arc::clone(&observed_cancel),
        },
    )));
    let sink = Arc::new(CountingSink {
        deliveries: Mutex::new(Vec::new()),
    });

    // First request hangs on its provider
    let first_scope = registry.register(&client).await;
    let first_token = first_scope.token().clone();
    let first_batch = {
        let orchestrator = Arc::clone(&orchestrator);
        let sink: Arc<dyn DeliverySink> = sink.clone();
        tokio::spawn(async move {
            orchestrator
                .run_batch("push-channel-7", &["TN-1".to_string()], sink, &first_token)
                .await
        })
    };

    // Give the first batch time to launch its race
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!first_scope.is_cancelled());

    // Second request from the same client supersedes the first
    let second_scope = registry.register(&client).await;
    assert!(first_scope.is_cancelled());
    assert!(!second_scope.is_cancelled());

    // The first batch unwinds and its provider saw the cancellation
    let summary = first_batch
        .await
        .expect("first batch task")
        .expect("first batch result");
    assert_eq!(summary.delivered, 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(observed_cancel.load(Ordering::SeqCst));
    assert!(sink.deliveries.lock().expect("sink lock").is_empty());
}

/// Provider that parks a cleanup task on its attempt handle, the way a
/// browser-session watcher does, then resolves immediately.
struct WatchfulProvider {
    watcher_unwound: Arc<AtomicBool>,
}

#[async_trait]
impl TrackingProvider for WatchfulProvider {
    async fn lookup(
        &self,
        _tracking_number: &TrackingNumber,
        cancel: CancellationToken,
    ) -> waybill_tracker::Result<ProviderOutcome> {
        let unwound = Arc::clone(&self.watcher_unwound);
        tokio::spawn(async move {
            cancel.cancelled().await;
            unwound.store(true, Ordering::SeqCst);
        });
        Ok(ProviderOutcome::found(async move {
            Ok(vec![StatusRecord::new(Timestamp::now(), "Delivered", true)])
        }))
    }

    fn provider_id(&self) -> &str {
        "watchful"
    }
}

#[tokio::test]
async fn test_attempt_watchers_unwind_after_successful_request() {
    let registry = ClientRegistry::new();
    let client = ClientId::new("push-channel-9").expect("valid client ID");

    let unwound = Arc::new(AtomicBool::new(false));
    let orchestrator = TrackingOrchestrator::new().with_provider(Arc::new(WatchfulProvider {
        watcher_unwound: Arc::clone(&unwound),
    }));
    let sink: Arc<dyn DeliverySink> = Arc::new(CountingSink {
        deliveries: Mutex::new(Vec::new()),
    });

    let scope = registry.register(&client).await;
    let summary = orchestrator
        .run_batch("push-channel-9", &["TN-1".to_string()], sink, scope.token())
        .await
        .expect("run batch");
    assert_eq!(summary.delivered, 1);

    registry.release(&scope).await;
    assert!(scope.is_cancelled());
    assert_eq!(registry.active_clients().await, 0);

    // On the success path nothing stays parked on the finished request's
    // handles: the cleanup task wakes instead of pinning its session forever.
    for _ in 0..100 {
        if unwound.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("attempt watcher never unwound after the request finished");
}

#[tokio::test]
async fn test_shutdown_cancels_in_flight_request() {
    let registry = ClientRegistry::new();
    let client = ClientId::new("push-channel-8").expect("valid client ID");

    let scope = registry.register(&client).await;
    assert!(!scope.is_cancelled());

    registry.shutdown().await;
    assert!(scope.is_cancelled());
    assert_eq!(registry.active_clients().await, 0);
}
