// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP status code mapping to operator-facing failure reasons.
//!
//! The controller's response body is always surfaced verbatim in the returned
//! error. This module adds a short, stable reason and a hint to the log line so
//! an operator can tell a bad token from a controller outage at a glance.
//!
//! # Usage
//!
//! ```rust
//! use zt_routes::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(401);
//! assert_eq!(reason, "ControllerAuthFailed");
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "NetworkNotFound");
//! ```

/// Request rejected as malformed
pub const REASON_CONTROLLER_BAD_REQUEST: &str = "ControllerBadRequest";

/// Token missing, wrong, or lacking access to the network
pub const REASON_CONTROLLER_AUTH_FAILED: &str = "ControllerAuthFailed";

/// Network ID unknown to the controller
pub const REASON_NETWORK_NOT_FOUND: &str = "NetworkNotFound";

/// Controller is throttling requests
pub const REASON_CONTROLLER_RATE_LIMITED: &str = "ControllerRateLimited";

/// Controller failed internally
pub const REASON_CONTROLLER_INTERNAL_ERROR: &str = "ControllerInternalError";

/// Gateway or availability problem in front of the controller
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Anything else, including no response at all
pub const REASON_CONTROLLER_UNREACHABLE: &str = "ControllerUnreachable";

/// Map HTTP status code to a failure reason and message.
///
/// # Arguments
///
/// * `status_code` - HTTP status code returned by the controller
///
/// # Returns
///
/// A tuple of `(reason, message)`:
/// - `reason` - One of the `REASON_*` constants in this module
/// - `message` - Human-readable explanation including the status code
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `ControllerBadRequest` | Invalid request body |
/// | 401 | `ControllerAuthFailed` | Token missing or wrong |
/// | 403 | `ControllerAuthFailed` | Token lacks access to the network |
/// | 404 | `NetworkNotFound` | Unknown network ID |
/// | 429 | `ControllerRateLimited` | Too many requests |
/// | 500 | `ControllerInternalError` | Internal server error |
/// | 502-504 | `GatewayError` | Gateway or availability problem |
/// | Other | `ControllerUnreachable` | Unexpected status |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_CONTROLLER_BAD_REQUEST,
            "Invalid request to controller API (400)".into(),
        ),
        401 => (
            REASON_CONTROLLER_AUTH_FAILED,
            "Controller authentication required, check the API token (401)".into(),
        ),
        403 => (
            REASON_CONTROLLER_AUTH_FAILED,
            "Controller authorization failed, token has no access to this network (403)".into(),
        ),
        404 => (
            REASON_NETWORK_NOT_FOUND,
            "Network not found on controller (404)".into(),
        ),
        429 => (
            REASON_CONTROLLER_RATE_LIMITED,
            "Controller rate limit reached (429)".into(),
        ),
        500 => (
            REASON_CONTROLLER_INTERNAL_ERROR,
            "Controller API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching controller (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Controller service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching controller (504)".into(),
        ),
        _ => (
            REASON_CONTROLLER_UNREACHABLE,
            format!("Unexpected HTTP status from controller ({status_code})"),
        ),
    }
}

/// Map a transport failure (no HTTP status received) to a reason and message.
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_CONTROLLER_UNREACHABLE,
        "Cannot connect to controller API".into(),
    )
}
