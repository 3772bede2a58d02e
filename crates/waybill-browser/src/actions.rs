use crate::error::{BrowserError, Result};

/// Navigation and extraction operations a tracking provider drives a
/// session with. The concrete scraping procedure for a carrier site lives
/// outside this crate; adapters compose these primitives.
#[async_trait::async_trait]
pub trait SessionActions {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Fill a form field by selector
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Wait for a selector to appear.
    ///
    /// Returns `Ok(false)` if the selector never appeared within the
    /// configured timeout; an absent element is an expected condition for
    /// lookups, not an error.
    async fn wait_for_selector(&self, selector: &str) -> Result<bool>;

    /// Extract inner text from an element
    async fn extract_text(&self, selector: &str) -> Result<String>;
}

/// Helper to extract the domain from a URL, for log fields.
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {e}")))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://grguweb.tmwcloud.com/trace/external.msw").unwrap(),
            "grguweb.tmwcloud.com"
        );
        assert_eq!(
            extract_domain("https://minimax.tracking.dtms.ca").unwrap(),
            "minimax.tracking.dtms.ca"
        );
    }

    #[test]
    fn test_extract_domain_invalid() {
        assert!(extract_domain("not-a-url").is_err());
    }
}
