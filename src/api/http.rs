//! Blocking HTTP client for the initialization endpoint.
//!
//! Uses the synchronous `ureq` client; the session is single-threaded, so
//! the init flow simply waits for the response.

use std::time::Duration;

use super::{InitClient, InitError, InitResponse};
use crate::config::schema::ApiConfig;

/// `GET {base_url}{init_path}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpInitClient {
    url: String,
    timeout: Option<Duration>,
}

impl HttpInitClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let url = config.init_url();
        Self {
            // "localhost" may resolve to ::1 first while demo backends only
            // bind IPv4.
            url: url.replace("://localhost", "://127.0.0.1"),
            timeout: (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl InitClient for HttpInitClient {
    fn fetch_init(&mut self) -> Result<InitResponse, InitError> {
        log::info!("making API call to {}", self.url);

        let mut request = ureq::get(&self.url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                log::warn!("init endpoint answered HTTP {status}");
                return Err(InitError::Status { status });
            }
            Err(e) => {
                log::warn!("init request failed: {e}");
                return Err(InitError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(InitError::Status { status });
        }

        let body: InitResponse = response
            .into_json()
            .map_err(|e| InitError::Decode(e.to_string()))?;

        log::debug!(
            "init response: devices_count={} homes_count={:?} homes={}",
            body.devices_count,
            body.homes_count,
            body.homes.len()
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = HttpInitClient::from_config(&ApiConfig::default());
        assert_eq!(client.url(), "http://127.0.0.1:8000/api/init");
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn localhost_is_pinned_to_ipv4() {
        let config = ApiConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..ApiConfig::default()
        };
        let client = HttpInitClient::from_config(&config);
        assert_eq!(client.url(), "http://127.0.0.1:9000/api/init");
    }

    #[test]
    fn zero_timeout_defers_to_transport() {
        let config = ApiConfig {
            timeout_ms: 0,
            ..ApiConfig::default()
        };
        assert_eq!(HttpInitClient::from_config(&config).timeout, None);
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is essentially never served on loopback.
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 2000,
            ..ApiConfig::default()
        };
        let mut client = HttpInitClient::from_config(&config);
        assert!(matches!(client.fetch_init(), Err(InitError::Transport(_))));
    }
}
