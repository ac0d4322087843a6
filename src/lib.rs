// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # zt-routes - Domain-based route reconciliation for virtual networks
//!
//! zt-routes keeps the route table of a software-defined network controller in
//! step with a declarative list of application domains. Each run resolves the
//! domains to IPv4 host routes, merges them with the network's own prefixes, and
//! replaces the controller's route table in a single request.
//!
//! ## Overview
//!
//! A run is a linear pipeline:
//!
//! ```text
//! LOAD -> RESOLVE -> BUILD -> (SYNC | PRINT) -> PERSIST
//! ```
//!
//! The resolved addresses are written back to the local configuration so the
//! file mirrors what was pushed (or, in debug mode, what would have been).
//!
//! ## Modules
//!
//! - [`config`] - Routes and network files, and their JSON/relaxed encodings
//! - [`resolver`] - IPv4-only domain resolution
//! - [`prefix`] - Address range to CIDR prefix conversion
//! - [`routes`] - Ordered route table construction
//! - [`controller`] - Controller HTTP client
//! - [`reconcile`] - The pipeline driver
//! - [`errors`] - Error taxonomy
//! - [`metrics`] - Prometheus run metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use zt_routes::config::ConfigFormat;
//! use zt_routes::controller::ControllerClient;
//! use zt_routes::reconcile::{Reconciler, RunOptions};
//! use zt_routes::resolver::HickoryResolver;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), zt_routes::errors::RoutesError> {
//! let resolver = HickoryResolver::from_system_conf();
//! let controller = ControllerClient::new("https://api.zerotier.com/api/v1")?;
//! let options = RunOptions {
//!     debug: true,
//!     token: None,
//!     format: ConfigFormat::Json,
//! };
//!
//! Reconciler::new(&resolver, &controller)
//!     .lookup(
//!         "8056c2e21c000001",
//!         Path::new("8056c2e21c000001.routes.json"),
//!         &options,
//!         &mut std::io::stdout(),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod http_errors;
pub mod metrics;
pub mod prefix;
pub mod reconcile;
pub mod resolver;
pub mod routes;

#[cfg(test)]
mod config_tests;
