// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for zt-routes.
//!
//! Every failure in the reconciliation pipeline is expressed as a [`RoutesError`].
//! Each variant records the name of the operation that produced it, and its
//! `Display` output starts with `"<operation>: "` so messages read as a trail
//! back to the failing step.
//!
//! There is no retry or local recovery anywhere in the crate. A single error
//! aborts the remaining steps of a run and is returned to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, resolving, building or syncing routes.
#[derive(Error, Debug)]
pub enum RoutesError {
    /// Missing or invalid configuration (required field, token, CLI argument)
    ///
    /// Returned before any controller request is attempted.
    #[error("{operation}: {reason}")]
    Config {
        /// The operation that rejected the configuration
        operation: &'static str,
        /// Human-readable explanation of what is missing or invalid
        reason: String,
    },

    /// DNS lookup failure (NXDOMAIN, network failure, timeout)
    #[error("{operation}: failed to resolve '{domain}': {reason}")]
    Resolution {
        /// The operation that performed the lookup
        operation: &'static str,
        /// The domain that failed to resolve
        domain: String,
        /// Resolver error text
        reason: String,
    },

    /// An address could not be parsed or the range mixes address families
    #[error("{operation}: invalid IP address '{address}': {reason}")]
    InvalidAddress {
        /// The operation that parsed the address
        operation: &'static str,
        /// The offending address (or `start-end` pair)
        address: String,
        /// Why the address was rejected
        reason: String,
    },

    /// The controller answered with a non-200 status, an unreadable body, or could
    /// not be reached at all
    ///
    /// `body` carries the raw response body verbatim so the controller's own
    /// diagnostic reaches the operator.
    #[error("{operation}: {body}")]
    Controller {
        /// The controller operation that failed
        operation: &'static str,
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Raw response body, or transport/decode error text
        body: String,
    },

    /// Reading or writing a configuration file failed
    #[error("{operation}: {}: {source}", path.display())]
    Io {
        /// The operation that touched the file
        operation: &'static str,
        /// The file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be decoded
    #[error("{operation}: failed to decode {}: {reason}", path.display())]
    Decode {
        /// The operation that decoded the file
        operation: &'static str,
        /// The file path
        path: PathBuf,
        /// Decoder error text
        reason: String,
    },

    /// A configuration value could not be encoded
    #[error("{operation}: failed to encode configuration: {reason}")]
    Encode {
        /// The operation that encoded the value
        operation: &'static str,
        /// Encoder error text
        reason: String,
    },

    /// The requested command exists on the CLI surface but has no implementation
    #[error("{command}: not implemented")]
    NotImplemented {
        /// The command name
        command: &'static str,
    },
}

impl RoutesError {
    /// Returns the name of the operation that produced this error.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Config { operation, .. }
            | Self::Resolution { operation, .. }
            | Self::InvalidAddress { operation, .. }
            | Self::Controller { operation, .. }
            | Self::Io { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Encode { operation, .. } => operation,
            Self::NotImplemented { command } => command,
        }
    }

    /// Returns a stable, prometheus-safe label for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config_error",
            Self::Resolution { .. } => "resolution_error",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::Controller { .. } => "controller_error",
            Self::Io { .. } => "io_error",
            Self::Decode { .. } => "decode_error",
            Self::Encode { .. } => "encode_error",
            Self::NotImplemented { .. } => "not_implemented",
        }
    }

    /// Shorthand for a [`RoutesError::Config`].
    pub(crate) fn config(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            operation,
            reason: reason.into(),
        }
    }
}
