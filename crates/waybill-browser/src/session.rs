use crate::actions::SessionActions;
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use waybill_core::BrowserSettings;

/// One remote browsing session owned by a single provider attempt.
///
/// The session is the expensive resource a lookup holds: a headless Chromium
/// process plus one page. Release is guaranteed exactly once on every exit
/// path - normal completion, error, and cooperative cancellation - and
/// double-release is a no-op.
pub struct BrowserSession {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler_task: JoinHandle<()>,
    closed: AtomicBool,
    // Fired by close() so cancellation watchers retire instead of parking
    // forever on a token that never cancels.
    closed_signal: CancellationToken,
    navigation_timeout: Duration,
    selector_timeout: Duration,
    selector_poll_interval: Duration,
}

impl BrowserSession {
    /// Launch a headless Chromium process and open one page.
    ///
    /// # Errors
    /// Returns error if Chromium cannot be launched within the configured
    /// timeout or the initial page cannot be opened.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| BrowserError::LaunchError(e.to_string()))?;

        let launch_timeout = Duration::from_millis(settings.launch_timeout_ms);
        let (browser, mut handler) = tokio::time::timeout(launch_timeout, Browser::launch(config))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "browser launch exceeded {}ms",
                    settings.launch_timeout_ms
                ))
            })?
            .map_err(|e| BrowserError::LaunchError(e.to_string()))?;

        // Drive CDP events until the session closes
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let mut browser = browser;
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    tracing::warn!(error = %close_err, "error closing browser after failed page open");
                }
                handler_task.abort();
                return Err(BrowserError::ChromiumError(e.to_string()));
            }
        };

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler_task,
            closed: AtomicBool::new(false),
            closed_signal: CancellationToken::new(),
            navigation_timeout: Duration::from_millis(settings.navigation_timeout_ms),
            selector_timeout: Duration::from_millis(settings.selector_timeout_ms),
            selector_poll_interval: Duration::from_millis(settings.selector_poll_interval_ms),
        })
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close the session, releasing the Chromium process.
    ///
    /// Idempotent: the first caller performs the teardown, later calls
    /// return immediately. Teardown errors are logged, not propagated, so a
    /// cleanup path never turns into a failure path.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "error closing browser process");
            }
        }
        drop(guard);
        self.handler_task.abort();
        self.closed_signal.cancel();
        Ok(())
    }

    /// Close this session as soon as `token` is cancelled.
    ///
    /// Used by provider adapters so a race loss or client disconnect tears
    /// the session down even mid-extraction. The watcher retires on its own
    /// once the session closes through any path, so a token that never fires
    /// does not pin the task or the session. The returned handle is only
    /// needed by callers that want to await or abort the watcher.
    pub fn close_on_cancel(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = session.closed_signal.cancelled() => return,
            }
            if session.is_closed() {
                return;
            }
            tracing::debug!("cancellation observed, closing browser session");
            if let Err(e) = session.close().await {
                tracing::warn!(error = %e, "failed to close browser session on cancellation");
            }
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.closed_signal.cancel();
        if self.closed.swap(true, Ordering::SeqCst) {
            self.handler_task.abort();
            return;
        }

        tracing::warn!("browser session dropped while still open");
        // Best-effort teardown: hand the Chromium handle to the runtime if
        // one is still around. The handler task keeps draining CDP events
        // until the browser goes away, then exits with its stream.
        let browser = self
            .browser
            .try_lock()
            .ok()
            .and_then(|mut guard| guard.take());
        match (browser, tokio::runtime::Handle::try_current()) {
            (Some(mut browser), Ok(handle)) => {
                handle.spawn(async move {
                    if let Err(e) = browser.close().await {
                        tracing::debug!(error = %e, "error closing dropped browser session");
                    }
                });
            }
            _ => {
                // No runtime or the browser is mid-close elsewhere; Chromium's
                // own drop kills the child process.
                self.handler_task.abort();
            }
        }
    }
}

#[async_trait::async_trait]
impl SessionActions for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigation to {url} timed out")))?
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        element
            .type_str(value)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<bool> {
        let deadline = Instant::now() + self.selector_timeout;
        loop {
            self.ensure_open()?;
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.selector_poll_interval).await;
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }
}
