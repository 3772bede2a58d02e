use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("launch failed: {0}")]
    LaunchError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("session already closed")]
    SessionClosed,
}

impl From<BrowserError> for waybill_core::WaybillError {
    fn from(err: BrowserError) -> Self {
        Self::Browser(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_into_core_error() {
        let err: waybill_core::WaybillError = BrowserError::SessionClosed.into();
        assert!(matches!(err, waybill_core::WaybillError::Browser(_)));
        assert!(err.to_string().contains("session already closed"));
    }
}
