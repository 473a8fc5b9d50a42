//! One-shot DNS pre-check, run before the first request of a batch.

use crate::error::DetectError;

/// Extract the host from an endpoint URL.
pub fn host_of(endpoint: &str) -> Option<String> {
    reqwest::Url::parse(endpoint)
        .ok()?
        .host_str()
        .map(str::to_string)
}

/// Resolve `host` and fail with `NetworkUnreachable` if it has no addresses.
pub async fn check_dns(host: &str) -> Result<(), DetectError> {
    tracing::debug!("Checking network connectivity ({host})");
    match tokio::net::lookup_host((host, 443)).await {
        Ok(mut addrs) => {
            if addrs.next().is_some() {
                tracing::debug!("Resolved {host}");
                Ok(())
            } else {
                Err(DetectError::NetworkUnreachable {
                    host: host.to_string(),
                    message: "no addresses returned".to_string(),
                })
            }
        }
        Err(e) => Err(DetectError::NetworkUnreachable {
            host: host.to_string(),
            message: e.to_string(),
        }),
    }
}
