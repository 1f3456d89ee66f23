//! Client side of the backend initialization call.
//!
//! The session only needs one thing from the backend: `GET /api/init`,
//! answering `{devices_count, homes_count?, homes}`. The call sits behind the
//! [`InitClient`] trait so the session can be driven by the blocking HTTP
//! client in [`http`] or by a scripted client in tests.

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::model::Homes;

pub use http::HttpInitClient;

/// Body of a successful initialization response.
///
/// Fields other than these (e.g. `message`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitResponse {
    pub devices_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homes_count: Option<u64>,
    #[serde(default)]
    pub homes: Homes,
}

impl InitResponse {
    /// Home count to record: the reported `homes_count` when present (even
    /// `0`), otherwise the number of homes in the payload.
    pub fn resolved_homes_count(&self) -> u64 {
        self.homes_count.unwrap_or(self.homes.len() as u64)
    }
}

/// Why an initialization attempt failed. Every variant is treated the same
/// way by the session: surface an error and let the user retry.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("init endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("init request failed: {0}")]
    Transport(String),

    #[error("init response could not be decoded: {0}")]
    Decode(String),
}

/// Anything able to perform the initialization call.
pub trait InitClient {
    fn fetch_init(&mut self) -> Result<InitResponse, InitError>;
}

impl<C: InitClient + ?Sized> InitClient for Box<C> {
    fn fetch_init(&mut self) -> Result<InitResponse, InitError> {
        (**self).fetch_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_count_wins_even_when_zero() {
        let response: InitResponse = serde_json::from_str(
            r#"{"devices_count": 3, "homes_count": 0, "homes": {"A": {"rooms": {}}}}"#,
        )
        .unwrap();
        assert_eq!(response.resolved_homes_count(), 0);
    }

    #[test]
    fn missing_count_is_recomputed_from_homes() {
        let response: InitResponse = serde_json::from_str(
            r#"{"message": "System initialized successfully", "devices_count": 12,
                "homes": {"A": {"rooms": {}}, "B": {"rooms": {}}}}"#,
        )
        .unwrap();
        assert_eq!(response.homes_count, None);
        assert_eq!(response.resolved_homes_count(), 2);
    }

    #[test]
    fn missing_devices_count_is_a_decode_error() {
        let result = serde_json::from_str::<InitResponse>(r#"{"homes": {}}"#);
        assert!(result.is_err());
    }
}
