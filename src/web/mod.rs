//! Demo backend for the dashboard.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that answers
//! the dashboard's initialization call from a homes JSON file, so the client
//! can be exercised without the real energy-management service:
//!
//! - `GET /api/init` — `{message, devices_count, homes}`
//! - `GET /api/homes` — the homes mapping
//! - `GET /api/health` — liveness
//!
//! Launched via `hemdash serve` (default: `http://127.0.0.1:8000`).

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::session::model::{Home, Homes, Room, SessionState};

// ---------------------------------------------------------------------------
// Backend data
// ---------------------------------------------------------------------------

/// Homes served by the demo backend.
#[derive(Debug, Clone)]
pub struct DemoBackend {
    homes: Homes,
}

#[derive(Serialize)]
struct InitBody<'a> {
    message: &'static str,
    devices_count: usize,
    homes: &'a Homes,
}

impl DemoBackend {
    pub fn new(homes: Homes) -> Self {
        Self { homes }
    }

    /// Read homes from a JSON file shaped like the init payload's `homes`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read homes file {}", path.display()))?;
        let homes: Homes = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse homes file {}", path.display()))?;
        Ok(Self::new(homes))
    }

    /// A small built-in topology.
    pub fn sample() -> Self {
        let home = |rooms: &[(&str, &[&str])]| Home {
            rooms: rooms
                .iter()
                .map(|(name, devices)| {
                    let room = Room {
                        devices: devices.iter().map(|d| d.to_string()).collect(),
                        extra: Default::default(),
                    };
                    (name.to_string(), room)
                })
                .collect(),
            extra: serde_json::Map::from_iter([(
                "comfort_range".to_string(),
                serde_json::json!([21, 25]),
            )]),
        };

        Self::new(IndexMap::from([
            (
                "Lakeside Cottage".to_string(),
                home(&[
                    ("Kitchen", &["Fridge", "Dishwasher", "Oven"]),
                    ("Living Room", &["TV", "Heat Pump", "Lamp"]),
                ]),
            ),
            (
                "City Flat".to_string(),
                home(&[
                    ("Bedroom", &["Lamp", "Air Conditioner"]),
                    ("Utility", &["Washing Machine", "Water Heater"]),
                ]),
            ),
        ]))
    }

    /// Distinct devices across every room, as the device registry counts them.
    pub fn devices_count(&self) -> usize {
        let state = SessionState {
            homes: Some(self.homes.clone()),
            ..Default::default()
        };
        state.device_names().len()
    }

    fn init_body(&self) -> Result<String> {
        let body = InitBody {
            message: "System initialized successfully",
            devices_count: self.devices_count(),
            homes: &self.homes,
        };
        serde_json::to_string(&body).context("failed to serialize init response")
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the demo backend on the given address. Blocks the current thread.
pub fn serve(addr: &str, backend: &DemoBackend) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("hemdash demo backend running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    handle_requests(&server, backend);
    Ok(())
}

/// Answer requests on `server` until it shuts down.
///
/// Handles requests sequentially; per-request failures become 500 responses
/// without stopping the loop.
pub fn handle_requests(server: &Server, backend: &DemoBackend) {
    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = match dispatch(&method, &url, backend) {
            Ok(resp) => resp,
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                json_response(body, 500)
            }
        };

        let status = response.status_code().0;
        if let Err(e) = request.respond(response) {
            log::warn!("failed to answer {method} {url}: {e}");
        }

        log::info!("{method} {url} {status}");
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(method: &Method, url: &str, backend: &DemoBackend) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/api/init") => Ok(json_response(backend.init_body()?, 200)),
        (&Method::Get, "/api/homes") => {
            let body = serde_json::to_string(&backend.homes).context("failed to serialize homes")?;
            Ok(json_response(body, 200))
        }
        (&Method::Get, "/api/health") => Ok(json_response(r#"{"status":"ok"}"#.to_string(), 200)),
        _ => Ok(json_response(r#"{"error":"not found"}"#.to_string(), 404)),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn json_response(body: String, status: u16) -> Response<Cursor<Vec<u8>>> {
    let response =
        Response::from_data(body.into_bytes()).with_status_code(StatusCode(status));
    match content_type_json() {
        Some(header) => response.with_header(header),
        None => response,
    }
}

/// JSON content type header.
fn content_type_json() -> Option<Header> {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_counts_distinct_devices() {
        // "Lamp" appears in both homes.
        assert_eq!(DemoBackend::sample().devices_count(), 9);
    }

    #[test]
    fn init_body_matches_client_shape() {
        let body = DemoBackend::sample().init_body().unwrap();
        let parsed: crate::api::InitResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.devices_count, 9);
        assert_eq!(parsed.homes_count, None);
        assert_eq!(parsed.resolved_homes_count(), 2);
    }

    #[test]
    fn unknown_routes_are_404() {
        let backend = DemoBackend::sample();
        let resp = dispatch(&Method::Get, "/api/nope", &backend).unwrap();
        assert_eq!(resp.status_code().0, 404);
        let resp = dispatch(&Method::Post, "/api/init", &backend).unwrap();
        assert_eq!(resp.status_code().0, 404);
    }

    #[test]
    fn query_strings_are_ignored_for_routing() {
        let backend = DemoBackend::sample();
        let resp = dispatch(&Method::Get, "/api/init?fresh=1", &backend).unwrap();
        assert_eq!(resp.status_code().0, 200);
    }

    #[test]
    fn homes_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homes.json");
        fs::write(&path, r#"{"Barn": {"rooms": {"Loft": {"devices": ["Fan"]}}}}"#).unwrap();

        let backend = DemoBackend::from_file(&path).unwrap();
        assert_eq!(backend.devices_count(), 1);
        assert!(DemoBackend::from_file(&dir.path().join("missing.json")).is_err());
    }
}
