use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use waybill_browser::{BrowserSession, SessionActions};
use waybill_core::BrowserSettings;

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_session_launch_and_close() {
    let session = BrowserSession::launch(&BrowserSettings::default())
        .await
        .expect("launch browser session");

    assert!(!session.is_closed());
    session.close().await.expect("close session");
    assert!(session.is_closed());
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_double_close_is_noop() {
    let session = BrowserSession::launch(&BrowserSettings::default())
        .await
        .expect("launch browser session");

    session.close().await.expect("first close");
    session.close().await.expect("second close is a no-op");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation() {
    let session = BrowserSession::launch(&BrowserSettings::default())
        .await
        .expect("launch browser session");

    session
        .navigate("https://example.com")
        .await
        .expect("navigate");
    let found = session.wait_for_selector("h1").await.expect("wait for h1");
    assert!(found);

    session.close().await.expect("close session");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_close_on_cancel() {
    let session = Arc::new(
        BrowserSession::launch(&BrowserSettings::default())
            .await
            .expect("launch browser session"),
    );

    let token = CancellationToken::new();
    session.close_on_cancel(token.clone());
    token.cancel();

    // The watcher closes the session shortly after the token fires
    for _ in 0..50 {
        if session.is_closed() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("session was not closed after cancellation");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_watcher_retires_after_normal_close() {
    let session = Arc::new(
        BrowserSession::launch(&BrowserSettings::default())
            .await
            .expect("launch browser session"),
    );

    // This token never fires; the watcher must still finish once the
    // session closes through the ordinary path.
    let token = CancellationToken::new();
    let watcher = session.close_on_cancel(token.clone());

    session.close().await.expect("close session");

    tokio::time::timeout(std::time::Duration::from_secs(5), watcher)
        .await
        .expect("watcher still running after close")
        .expect("watcher task");
    assert!(!token.is_cancelled());
}
