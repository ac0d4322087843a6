// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route set construction.
//!
//! Turns resolved addresses, static addresses and pool prefixes into the ordered
//! route table pushed to the controller:
//!
//! 1. Network-level routes (pool prefixes or the LAN), no `via`
//! 2. Host routes `<address>/32 via <exit node>`, in config order
//!
//! Nothing is sorted or de-duplicated. An address reached through two domains
//! produces two host routes.

use crate::config::{default_exit_node, App, Group};
use crate::constants::IPV4_HOST_SUFFIX;
use crate::controller::RemoteRoute;
use std::fmt::Display;
use std::net::Ipv4Addr;

/// A `/32` host route to `address` through `exit_node`.
///
/// `via` is omitted when there is no exit node.
#[must_use]
pub fn host_route(address: impl Display, exit_node: Option<&str>) -> RemoteRoute {
    RemoteRoute {
        target: format!("{address}{IPV4_HOST_SUFFIX}"),
        via: exit_node.map(str::to_string),
    }
}

/// Host routes for a batch of addresses, in order.
pub fn host_routes<I>(addresses: I, exit_node: Option<&str>) -> Vec<RemoteRoute>
where
    I: IntoIterator,
    I::Item: Display,
{
    addresses
        .into_iter()
        .map(|address| host_route(address, exit_node))
        .collect()
}

/// Host routes for one group or app: resolved addresses first, then static ones.
///
/// # Example
///
/// ```rust
/// use zt_routes::routes::build_host_routes;
///
/// let routes = build_host_routes(&[], &["203.0.113.9".to_string()], Some("198.51.100.1"));
/// assert_eq!(routes[0].target, "203.0.113.9/32");
/// assert_eq!(routes[0].via.as_deref(), Some("198.51.100.1"));
/// ```
#[must_use]
pub fn build_host_routes(
    resolved: &[Ipv4Addr],
    static_ips: &[String],
    exit_node: Option<&str>,
) -> Vec<RemoteRoute> {
    let mut routes = host_routes(resolved, exit_node);
    routes.extend(host_routes(static_ips, exit_node));
    routes
}

/// Directly reachable routes for the controller's pool prefixes.
#[must_use]
pub fn pool_routes(prefixes: &[String]) -> Vec<RemoteRoute> {
    prefixes.iter().map(RemoteRoute::direct).collect()
}

/// Host routes of a group's last-resolved addresses.
///
/// The group's own exit node wins over `default_exit`.
#[must_use]
pub fn group_routes(group: &Group, default_exit: Option<&str>) -> Vec<RemoteRoute> {
    let exit_node = group
        .exit_node
        .as_deref()
        .filter(|node| !node.is_empty())
        .or(default_exit);

    host_routes(
        group.routes.iter().flat_map(|route| route.ips.iter()),
        exit_node,
    )
}

/// Full route table of a network described by a routes file.
///
/// Pool routes come first, followed by every group's host routes. Disabled
/// groups contribute their last-known addresses.
#[must_use]
pub fn build_network_routes(pool_prefixes: &[String], groups: &[Group]) -> Vec<RemoteRoute> {
    let default_exit = default_exit_node(groups);

    let mut routes = pool_routes(pool_prefixes);
    for group in groups {
        routes.extend(group_routes(group, default_exit));
    }
    routes
}

/// Full route table of a network described by a network file.
///
/// The LAN route comes first, followed by each app's routes in order.
#[must_use]
pub fn build_app_table(lan: &str, apps: &[App]) -> Vec<RemoteRoute> {
    let mut routes = vec![RemoteRoute::direct(lan)];
    for app in apps {
        routes.extend(app.routes.iter().cloned());
    }
    routes
}
