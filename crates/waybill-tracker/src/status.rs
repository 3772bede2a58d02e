//! Static liveness payload for a status endpoint.

use serde::Serialize;
use waybill_core::Timestamp;

/// Liveness payload returned by a status probe.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Configured service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Probe time
    pub time: Timestamp,
}

/// Build the current liveness payload.
#[must_use]
pub fn probe(service_name: &str) -> ServiceStatus {
    ServiceStatus {
        service: service_name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Timestamp::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payload() {
        let status = probe("waybill");
        assert_eq!(status.service, "waybill");
        assert!(!status.version.is_empty());

        let json = serde_json::to_string(&status).expect("serialize status");
        assert!(json.contains("\"service\":\"waybill\""));
    }
}
