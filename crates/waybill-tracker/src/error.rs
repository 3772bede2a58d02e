use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("provider {provider} failed for {tracking_number}: {message}")]
    Provider {
        provider: String,
        tracking_number: String,
        message: String,
    },

    #[error("delivery failed for {tracking_number}: {message}")]
    Delivery {
        tracking_number: String,
        message: String,
    },

    #[error("browser error: {0}")]
    Browser(#[from] waybill_browser::BrowserError),

    #[error(transparent)]
    Core(#[from] waybill_core::WaybillError),
}

pub type Result<T> = std::result::Result<T, TrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = TrackError::Provider {
            provider: "guilbault".to_string(),
            tracking_number: "TN-1".to_string(),
            message: "status table never appeared".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "provider guilbault failed for TN-1: status table never appeared"
        );
    }

    #[test]
    fn test_error_from_browser() {
        let err: TrackError = waybill_browser::BrowserError::SessionClosed.into();
        assert!(matches!(err, TrackError::Browser(_)));
    }
}
