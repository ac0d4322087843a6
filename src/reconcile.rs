// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation driver.
//!
//! One invocation runs a linear pipeline over one network:
//!
//! ```text
//! LOAD -> RESOLVE -> BUILD -> (SYNC | PRINT) -> PERSIST -> DONE
//! ```
//!
//! - **LOAD** reads the configuration and rejects missing required fields,
//!   including the token and default exit node when syncing.
//! - **RESOLVE** looks up every domain, one at a time, in config order.
//! - **BUILD** assembles the full route table.
//! - **SYNC** replaces the controller's route table. Skipped in debug mode.
//! - **PRINT** writes the result to the output instead. Debug mode only.
//! - **PERSIST** writes the configuration back with the resolved addresses.
//!
//! A failure in LOAD, RESOLVE or BUILD aborts the run before anything is written.
//! PERSIST runs whether or not SYNC succeeded; a SYNC error is returned after the
//! file has been written. There is no rollback.
//!
//! Two configuration shapes are supported:
//!
//! - [`Reconciler::lookup`] drives a routes file (groups of domains). The table is
//!   the controller's pool prefixes followed by every group's host routes.
//! - [`Reconciler::sync_network`] drives a network file (apps with domains and
//!   static IPs). The table is the LAN prefix followed by every app's routes.

use crate::config::{
    self, default_exit_node, ConfigFormat, Group, NetworkConfig, Route, RoutesConfig,
};
use crate::controller::{Controller, RemoteRoute};
use crate::errors::RoutesError;
use crate::prefix::pool_prefixes;
use crate::resolver::{resolve_ipv4, Resolve};
use crate::routes::{build_app_table, build_host_routes, build_network_routes};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};

/// Options shared by every reconciliation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Resolve and persist without contacting the controller; print the result
    pub debug: bool,
    /// Controller API token, required unless `debug` is set
    pub token: Option<String>,
    /// Encoding of the configuration file
    pub format: ConfigFormat,
}

impl RunOptions {
    /// The token to sync with, or `None` in debug mode.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Config`] when not in debug mode and no non-empty
    /// token was supplied.
    pub fn sync_token(&self) -> Result<Option<&str>, RoutesError> {
        if self.debug {
            return Ok(None);
        }
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Some(token)),
            _ => Err(RoutesError::config(
                "sync_token",
                "flag not provided: token (or set ZT_TOKEN)",
            )),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Network the run applied to
    pub network_id: String,
    /// Number of domains looked up
    pub domains_resolved: usize,
    /// Number of routes in the built table (debug `lookup` runs exclude pool routes)
    pub routes: usize,
    /// Whether the table was pushed to the controller
    pub synced: bool,
}

/// Drives runs against a resolver and a controller.
pub struct Reconciler<'a> {
    resolver: &'a dyn Resolve,
    controller: &'a dyn Controller,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(resolver: &'a dyn Resolve, controller: &'a dyn Controller) -> Self {
        Self {
            resolver,
            controller,
        }
    }

    /// Reconcile the routes file at `path` for `network_id`.
    ///
    /// In debug mode the controller is never contacted and the resolved routes
    /// file is printed to `out` as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns the first error of the pipeline. See the module documentation for
    /// which steps still run after a failure.
    pub async fn lookup(
        &self,
        network_id: &str,
        path: &Path,
        options: &RunOptions,
        out: &mut (dyn Write + Send),
    ) -> Result<RunReport, RoutesError> {
        const OPERATION: &str = "lookup";

        // LOAD
        if network_id.trim().is_empty() {
            return Err(RoutesError::config(
                OPERATION,
                "argument can not be empty: NETWORK",
            ));
        }
        let token = options.sync_token()?;
        let mut groups = config::load_routes_config(path, options.format).await?;
        info!(
            network = %network_id,
            path = %path.display(),
            groups = groups.len(),
            "Loaded routes file"
        );
        if token.is_some() && default_exit_node(&groups).is_none() {
            return Err(RoutesError::config(
                OPERATION,
                "the first group must define exitNode",
            ));
        }

        // RESOLVE
        let domains_resolved = resolve_groups(self.resolver, &mut groups).await?;

        // BUILD + SYNC | PRINT
        let outcome = match token {
            Some(token) => self
                .sync_groups(network_id, token, &groups)
                .await
                .map(|routes| (routes, true)),
            None => {
                let routes = build_network_routes(&[], &groups).len();
                print_json(out, &groups).map(|()| (routes, false))
            }
        };

        // PERSIST
        let persisted = config::save_routes_config(&groups, path, options.format).await;

        let (routes, synced) = finish(outcome, persisted)?;
        Ok(RunReport {
            network_id: network_id.to_string(),
            domains_resolved,
            routes,
            synced,
        })
    }

    /// Reconcile the network file at `path`.
    ///
    /// In debug mode the controller is never contacted and the built route table
    /// is printed to `out` as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns the first error of the pipeline. See the module documentation for
    /// which steps still run after a failure.
    pub async fn sync_network(
        &self,
        path: &Path,
        options: &RunOptions,
        out: &mut (dyn Write + Send),
    ) -> Result<RunReport, RoutesError> {
        // LOAD
        let token = options.sync_token()?;
        let mut network = config::load_network_config(path, options.format).await?;
        info!(
            network = %network.network_id,
            path = %path.display(),
            apps = network.apps.len(),
            "Loaded network file"
        );

        // RESOLVE + BUILD
        let domains_resolved = resolve_apps(self.resolver, &mut network).await?;
        let table = build_app_table(&network.lan, &network.apps);

        // SYNC | PRINT
        let outcome = match token {
            Some(token) => self
                .controller
                .push_routes(&network.network_id, token, &table)
                .await
                .map(|()| true),
            None => {
                info!("DEBUG MODE: skipping controller update");
                print_json(out, &table).map(|()| false)
            }
        };

        // PERSIST
        let persisted = config::save_network_config(&network, path, options.format).await;

        let synced = finish(outcome, persisted)?;
        Ok(RunReport {
            network_id: network.network_id,
            domains_resolved,
            routes: table.len(),
            synced,
        })
    }

    /// BUILD and SYNC for a routes file: fetch pools, build, push.
    async fn sync_groups(
        &self,
        network_id: &str,
        token: &str,
        groups: &[Group],
    ) -> Result<usize, RoutesError> {
        let pools = self.controller.fetch_pools(network_id, token).await?;
        let prefixes = pool_prefixes(&pools)?;
        debug!(network = %network_id, prefixes = ?prefixes, "Converted address pools");

        let routes = build_network_routes(&prefixes, groups);
        self.controller
            .push_routes(network_id, token, &routes)
            .await?;
        Ok(routes.len())
    }
}

/// Resolve every route of every enabled group.
///
/// Each enabled group's route list is rebuilt from fresh lookups and replaced
/// wholesale. Disabled groups are not touched. Returns the number of domains
/// looked up.
///
/// # Errors
///
/// Returns the first lookup failure. Groups resolved before the failure keep
/// their new addresses in memory; callers must not persist them.
pub async fn resolve_groups(
    resolver: &dyn Resolve,
    groups: &mut RoutesConfig,
) -> Result<usize, RoutesError> {
    let mut resolved = 0;

    for group in groups.iter_mut() {
        if !group.enabled {
            debug!(group = %group.name, "Group disabled, keeping last-known addresses");
            continue;
        }

        let mut routes = Vec::with_capacity(group.routes.len());
        for route in &group.routes {
            let ips = resolve_ipv4(resolver, &route.domain).await?;
            routes.push(Route {
                domain: route.domain.clone(),
                ips: ips.iter().map(ToString::to_string).collect(),
            });
            resolved += 1;
        }

        info!(group = %group.name, routes = routes.len(), "Resolved group");
        group.routes = routes;
    }

    Ok(resolved)
}

/// Resolve every app of a network file and rebuild its routes.
///
/// Each app's `routes` becomes its domains' host routes followed by its static
/// `ips`, all through the network exit node. Returns the number of domains
/// looked up.
///
/// # Errors
///
/// Returns the first lookup failure.
pub async fn resolve_apps(
    resolver: &dyn Resolve,
    network: &mut NetworkConfig,
) -> Result<usize, RoutesError> {
    let mut resolved = 0;
    let exit_node = Some(network.exit_node.as_str());

    for app in &mut network.apps {
        let mut addresses = Vec::new();
        for domain in &app.domains {
            addresses.extend(resolve_ipv4(resolver, domain).await?);
            resolved += 1;
        }

        let routes: Vec<RemoteRoute> = build_host_routes(&addresses, &app.ips, exit_node);
        info!(app = %app.name, routes = routes.len(), "Resolved app");
        app.routes = routes;
    }

    Ok(resolved)
}

fn print_json<T: Serialize + ?Sized>(
    out: &mut (dyn Write + Send),
    value: &T,
) -> Result<(), RoutesError> {
    const OPERATION: &str = "print";

    let text = serde_json::to_string_pretty(value).map_err(|e| RoutesError::Encode {
        operation: OPERATION,
        reason: e.to_string(),
    })?;

    writeln!(out, "{text}").map_err(|source| RoutesError::Io {
        operation: OPERATION,
        path: "<stdout>".into(),
        source,
    })
}

/// Combine the SYNC|PRINT outcome with the PERSIST result.
///
/// The SYNC|PRINT error wins; a PERSIST error that accompanies it is logged.
fn finish<T>(
    outcome: Result<T, RoutesError>,
    persisted: Result<(), RoutesError>,
) -> Result<T, RoutesError> {
    match (outcome, persisted) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(persist_error)) => {
            error!(error = %persist_error, "Failed to persist configuration after failed update");
            Err(e)
        }
    }
}
