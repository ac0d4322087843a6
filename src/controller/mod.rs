// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Network controller client.
//!
//! The controller holds the authoritative route table of a virtual network.
//! This module reads its address-assignment pools and replaces its route table
//! over an authenticated HTTPS JSON API:
//!
//! - `GET  {base}/network/{id}` returns `config.ipAssignmentPools`
//! - `POST {base}/network/{id}` with `{"config": {"routes": [...]}}` replaces the routes
//!
//! Requests carry `Authorization: token <T>`.
//!
//! # Example
//!
//! ```rust,no_run
//! use zt_routes::controller::{Controller, ControllerClient};
//!
//! # async fn example() -> Result<(), zt_routes::errors::RoutesError> {
//! let client = ControllerClient::new("https://api.zerotier.com/api/v1")?;
//! let pools = client.fetch_pools("8056c2e21c000001", "secret-token").await?;
//! # Ok(())
//! # }
//! ```

pub mod network_ops;
pub mod types;

pub use types::{AddressPool, RemoteRoute};

use crate::errors::RoutesError;
use async_trait::async_trait;
use reqwest::Client as HttpClient;

/// Operations the reconciliation driver needs from a controller.
///
/// [`ControllerClient`] is the HTTP implementation; tests substitute their own.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Read the address-assignment pools of `network_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Controller`] on any non-200 response or malformed body.
    async fn fetch_pools(
        &self,
        network_id: &str,
        token: &str,
    ) -> Result<Vec<AddressPool>, RoutesError>;

    /// Replace the full route table of `network_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Controller`] on any non-200 response.
    async fn push_routes(
        &self,
        network_id: &str,
        token: &str,
        routes: &[RemoteRoute],
    ) -> Result<(), RoutesError>;
}

/// HTTP client for the controller API.
///
/// The base URL is configuration, so tests can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    /// HTTP client for API requests
    client: HttpClient,
    /// Base URL without trailing slash
    base_url: String,
}

impl ControllerClient {
    /// Create a client for the controller at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Config`] if `base_url` is not a valid http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, RoutesError> {
        Self::with_http_client(HttpClient::new(), base_url)
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Config`] if `base_url` is not a valid http(s) URL.
    pub fn with_http_client(client: HttpClient, base_url: &str) -> Result<Self, RoutesError> {
        Ok(Self {
            client,
            base_url: network_ops::build_api_url(base_url)?,
        })
    }

    /// The normalized base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a single network resource.
    #[must_use]
    pub fn network_url(&self, network_id: &str) -> String {
        network_ops::network_url(&self.base_url, network_id)
    }
}

#[async_trait]
impl Controller for ControllerClient {
    async fn fetch_pools(
        &self,
        network_id: &str,
        token: &str,
    ) -> Result<Vec<AddressPool>, RoutesError> {
        network_ops::fetch_pools(&self.client, &self.base_url, network_id, token).await
    }

    async fn push_routes(
        &self,
        network_id: &str,
        token: &str,
        routes: &[RemoteRoute],
    ) -> Result<(), RoutesError> {
        network_ops::push_routes(&self.client, &self.base_url, network_id, token, routes).await
    }
}

// Declare test modules
#[cfg(test)]
mod mod_tests;
