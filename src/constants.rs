// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for zt-routes.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Controller API Constants
// ============================================================================

/// Default base URL of the ZeroTier Central controller API
pub const DEFAULT_API_URL: &str = "https://api.zerotier.com/api/v1";

/// Path segment under which networks are addressed (`{base}/network/{id}`)
pub const NETWORK_PATH_SEGMENT: &str = "network";

/// Scheme word placed before the token in the `Authorization` header
pub const AUTHORIZATION_SCHEME: &str = "token";

/// Content type sent with every controller request
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Environment Variables
// ============================================================================

/// Environment variable holding the controller API token
pub const TOKEN_ENV_VAR: &str = "ZT_TOKEN";

/// Environment variable overriding the controller API base URL
pub const API_URL_ENV_VAR: &str = "ZT_API_URL";

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_ENV_VAR: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Configuration File Constants
// ============================================================================

/// Default path of the network-level configuration file (relaxed dialect)
pub const DEFAULT_NETWORK_CONFIG_PATH: &str = "./zt_routes.hjson";

/// Default directory holding per-network routes files
pub const DEFAULT_ROUTES_DIR: &str = ".";

/// Suffix appended to a network ID to form its routes file name
pub const ROUTES_FILE_SUFFIX: &str = ".routes.json";

/// Group that `add` targets when `--group` is not given
pub const DEFAULT_GROUP: &str = "default";

/// Indentation used when writing strict JSON configuration files
pub const JSON_FILE_INDENT: &[u8] = b"\t";

/// Indentation used when writing relaxed (Hjson) configuration files
pub const RELAXED_FILE_INDENT: &[u8] = b"  ";

// ============================================================================
// Routing Constants
// ============================================================================

/// Prefix length suffix of an IPv4 host route
pub const IPV4_HOST_SUFFIX: &str = "/32";

/// Number of bits in an IPv4 address
pub const IPV4_BITS: u32 = 32;

/// Number of bits in an IPv6 address
pub const IPV6_BITS: u32 = 128;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Namespace prefix for all zt-routes metrics (prometheus-safe)
pub const METRICS_NAMESPACE: &str = "zt_routes";
