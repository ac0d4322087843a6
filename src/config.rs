// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local declarative configuration and its on-disk store.
//!
//! Two file shapes exist:
//!
//! - **Routes file** (`<dir>/<NETWORK>.routes.json`): a list of [`Group`]s, each holding
//!   domains and their last-resolved IPv4 addresses.
//! - **Network file** (default `./zt_routes.hjson`): a single [`NetworkConfig`] with the
//!   network ID, exit node, LAN prefix and a list of [`App`]s.
//!
//! Either shape can be stored as strict JSON or in the relaxed dialect
//! ([`ConfigFormat`]). The format is always chosen by the caller, never sniffed from
//! file contents. Saving rewrites the whole file.
//!
//! # Example
//!
//! ```rust,no_run
//! use zt_routes::config::{load_routes_config, save_routes_config, routes_file_path, ConfigFormat};
//!
//! # async fn example() -> Result<(), zt_routes::errors::RoutesError> {
//! let path = routes_file_path(".", "8056c2e21c000001");
//! let groups = load_routes_config(&path, ConfigFormat::Json).await?;
//! save_routes_config(&groups, &path, ConfigFormat::Json).await?;
//! # Ok(())
//! # }
//! ```

use crate::constants::{JSON_FILE_INDENT, RELAXED_FILE_INDENT, ROUTES_FILE_SUFFIX};
use crate::controller::RemoteRoute;
use crate::errors::RoutesError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// Routes file
// ============================================================================

/// A domain and the IPv4 addresses it resolved to on the last run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    pub domain: String,

    #[serde(default)]
    pub ips: Vec<String>,
}

impl Route {
    /// A route that has not been resolved yet.
    #[must_use]
    pub fn unresolved(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ips: Vec::new(),
        }
    }
}

/// A named set of routes sharing an exit node.
///
/// Disabled groups are skipped during resolution and keep their last-known `ips`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group")]
    pub name: String,

    #[serde(
        rename = "isEnabled",
        alias = "enabled",
        default,
        skip_serializing_if = "is_false"
    )]
    pub enabled: bool,

    /// Device (linux server) through which to route traffic
    #[serde(rename = "exitNode", default, skip_serializing_if = "Option::is_none")]
    pub exit_node: Option<String>,

    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Contents of a routes file.
pub type RoutesConfig = Vec<Group>;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Exit node of the first group, the default for every group without its own.
#[must_use]
pub fn default_exit_node(groups: &[Group]) -> Option<&str> {
    groups
        .first()
        .and_then(|group| group.exit_node.as_deref())
        .filter(|node| !node.is_empty())
}

/// Path of the routes file for `network_id` inside `dir`.
#[must_use]
pub fn routes_file_path(dir: impl AsRef<Path>, network_id: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{network_id}{ROUTES_FILE_SUFFIX}"))
}

// ============================================================================
// Network file
// ============================================================================

/// An application: domains and static addresses routed through the exit node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub name: String,

    /// List of domains to route
    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,

    /// Controller routes derived from `domains` and `ips` on the last run
    #[serde(default)]
    pub routes: Vec<RemoteRoute>,
}

/// Network-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "networkId", default)]
    pub network_id: String,

    /// Device (linux server) through which to route traffic
    #[serde(rename = "exitNode", default)]
    pub exit_node: String,

    #[serde(default)]
    pub lan: String,

    #[serde(default)]
    pub apps: Vec<App>,
}

impl NetworkConfig {
    /// Check that the fields every run depends on are present.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Config`] naming the first missing field.
    pub fn validate(&self) -> Result<(), RoutesError> {
        const OPERATION: &str = "validate_network_config";

        if self.network_id.trim().is_empty() {
            return Err(RoutesError::config(OPERATION, "Network ID is required"));
        }
        if self.exit_node.trim().is_empty() {
            return Err(RoutesError::config(
                OPERATION,
                "Exit Node address is required",
            ));
        }
        if self.lan.trim().is_empty() {
            return Err(RoutesError::config(OPERATION, "LAN is required"));
        }
        Ok(())
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// On-disk encoding of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// Strict JSON
    Json,
    /// Hjson: quoteless keys and values, optional commas, `#`, `//` and `/* */` comments
    Relaxed,
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// Decode `text` in the given format.
///
/// # Errors
///
/// Returns [`RoutesError::Decode`] if `text` is not valid in `format`.
pub fn decode<T: DeserializeOwned>(
    text: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<T, RoutesError> {
    const OPERATION: &str = "decode_config";

    let decode_error = |reason: String| RoutesError::Decode {
        operation: OPERATION,
        path: path.to_path_buf(),
        reason,
    };

    match format {
        ConfigFormat::Json => serde_json::from_str(text).map_err(|e| decode_error(e.to_string())),
        ConfigFormat::Relaxed => {
            deser_hjson::from_str(text).map_err(|e| decode_error(e.to_string()))
        }
    }
}

/// Encode `value` in the given format.
///
/// Strict JSON is tab-indented. Relaxed files are written as two-space indented
/// JSON, which every Hjson reader accepts.
///
/// # Errors
///
/// Returns [`RoutesError::Encode`] if serialization fails.
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    format: ConfigFormat,
) -> Result<String, RoutesError> {
    match format {
        ConfigFormat::Json => encode_json(value, JSON_FILE_INDENT),
        ConfigFormat::Relaxed => encode_json(value, RELAXED_FILE_INDENT),
    }
}

fn encode_json<T: Serialize + ?Sized>(value: &T, indent: &[u8]) -> Result<String, RoutesError> {
    const OPERATION: &str = "encode_config";

    let encode_error = |reason: String| RoutesError::Encode {
        operation: OPERATION,
        reason,
    };

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| encode_error(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| encode_error(e.to_string()))
}

// ============================================================================
// Store
// ============================================================================

/// Load and decode a configuration file.
///
/// # Errors
///
/// Returns [`RoutesError::Io`] if the file cannot be read and
/// [`RoutesError::Decode`] if it cannot be decoded.
pub async fn load<T: DeserializeOwned>(
    path: &Path,
    format: ConfigFormat,
) -> Result<T, RoutesError> {
    const OPERATION: &str = "load_config";

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RoutesError::Io {
            operation: OPERATION,
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        path = %path.display(),
        format = %format,
        bytes = text.len(),
        "Loaded configuration file"
    );
    decode(&text, format, path)
}

/// Encode and write a configuration file, replacing any previous contents.
///
/// # Errors
///
/// Returns [`RoutesError::Encode`] if encoding fails and [`RoutesError::Io`] if
/// the file cannot be created or written.
pub async fn save<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    format: ConfigFormat,
) -> Result<(), RoutesError> {
    const OPERATION: &str = "save_config";

    let text = encode(value, format)?;

    tokio::fs::write(path, text.as_bytes())
        .await
        .map_err(|source| RoutesError::Io {
            operation: OPERATION,
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), format = %format, "Saved configuration file");
    Ok(())
}

/// Load a routes file.
///
/// # Errors
///
/// See [`load`].
pub async fn load_routes_config(
    path: &Path,
    format: ConfigFormat,
) -> Result<RoutesConfig, RoutesError> {
    load(path, format).await
}

/// Save a routes file.
///
/// # Errors
///
/// See [`save`].
pub async fn save_routes_config(
    groups: &[Group],
    path: &Path,
    format: ConfigFormat,
) -> Result<(), RoutesError> {
    save(groups, path, format).await
}

/// Load and validate a network file.
///
/// # Errors
///
/// See [`load`]; additionally returns [`RoutesError::Config`] when a required
/// field is missing.
pub async fn load_network_config(
    path: &Path,
    format: ConfigFormat,
) -> Result<NetworkConfig, RoutesError> {
    let network: NetworkConfig = load(path, format).await?;
    network.validate()?;
    Ok(network)
}

/// Save a network file.
///
/// # Errors
///
/// See [`save`].
pub async fn save_network_config(
    network: &NetworkConfig,
    path: &Path,
    format: ConfigFormat,
) -> Result<(), RoutesError> {
    save(network, path, format).await
}

// ============================================================================
// Editing
// ============================================================================

/// Append unresolved routes for `domains` to group `group_name`.
///
/// The group is created (enabled) when missing. Domains already present in the
/// group are skipped. Returns the number of routes added.
pub fn add_domains(groups: &mut RoutesConfig, group_name: &str, domains: &[String]) -> usize {
    let index = match groups.iter().position(|group| group.name == group_name) {
        Some(index) => index,
        None => {
            info!(group = %group_name, "Creating group");
            groups.push(Group {
                name: group_name.to_string(),
                enabled: true,
                ..Group::default()
            });
            groups.len() - 1
        }
    };

    let group = &mut groups[index];
    let mut added = 0;
    for domain in domains {
        if group.routes.iter().any(|route| &route.domain == domain) {
            warn!(group = %group_name, domain = %domain, "Domain already present, skipping");
            continue;
        }
        group.routes.push(Route::unresolved(domain.clone()));
        added += 1;
    }
    added
}

/// Add `domains` to a routes file and save it.
///
/// A missing routes file starts out empty.
///
/// # Errors
///
/// Returns [`RoutesError::Config`] if `domains` is empty, plus any load/save error.
pub async fn add_to_routes_file(
    path: &Path,
    group_name: &str,
    domains: &[String],
    format: ConfigFormat,
) -> Result<usize, RoutesError> {
    const OPERATION: &str = "add";

    if domains.is_empty() {
        return Err(RoutesError::config(OPERATION, "at least one DOMAIN is required"));
    }
    if group_name.is_empty() {
        return Err(RoutesError::config(OPERATION, "group can not be empty"));
    }

    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| RoutesError::Io {
            operation: OPERATION,
            path: path.to_path_buf(),
            source,
        })?;

    let mut groups: RoutesConfig = if exists {
        load_routes_config(path, format).await?
    } else {
        info!(path = %path.display(), "Routes file does not exist, starting empty");
        Vec::new()
    };

    let added = add_domains(&mut groups, group_name, domains);
    save_routes_config(&groups, path, format).await?;
    Ok(added)
}

/// Copy the routes of one network into another network's routes file.
///
/// The destination file is fully overwritten.
///
/// # Errors
///
/// Returns [`RoutesError::Config`] if either network ID is empty, plus any load/save error.
pub async fn clone_routes_file(
    dir: &Path,
    source_network: &str,
    destination_network: &str,
    format: ConfigFormat,
) -> Result<RoutesConfig, RoutesError> {
    const OPERATION: &str = "clone";

    if source_network.is_empty() {
        return Err(RoutesError::config(OPERATION, "source can not be empty"));
    }
    if destination_network.is_empty() {
        return Err(RoutesError::config(OPERATION, "destination can not be empty"));
    }

    let groups = load_routes_config(&routes_file_path(dir, source_network), format).await?;
    save_routes_config(&groups, &routes_file_path(dir, destination_network), format).await?;

    info!(
        source = %source_network,
        destination = %destination_network,
        groups = groups.len(),
        "Cloned routes"
    );
    Ok(groups)
}
