// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain to IPv4 address resolution.
//!
//! A [`Resolve`] implementation performs one forward lookup per domain and may
//! return both IPv4 and IPv6 addresses. [`resolve_ipv4`] keeps only the
//! addresses with a 4-byte form, in resolver order, and emits a notice for each
//! IPv6 address it drops.
//!
//! Lookups are never retried here and results are never shared between domains.

use crate::errors::RoutesError;
use crate::metrics;
use async_trait::async_trait;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info, warn};

/// A forward DNS lookup.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Look up every address of `domain`, IPv4 and IPv6 alike.
    ///
    /// # Errors
    ///
    /// Returns [`RoutesError::Resolution`] on NXDOMAIN, network failure or timeout.
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, RoutesError>;
}

/// DNS resolver backed by hickory-dns using the system configuration.
///
/// Both A and AAAA records are requested so the IPv6 notice reflects what the
/// network actually answers. Each lookup is attempted once.
#[derive(Clone)]
pub struct HickoryResolver {
    resolver: TokioResolver,
}

impl HickoryResolver {
    /// Create a resolver from `/etc/resolv.conf` (or the platform equivalent),
    /// falling back to hickory's defaults when the system configuration is unreadable.
    #[must_use]
    pub fn from_system_conf() -> Self {
        let mut builder = match TokioResolver::builder_tokio() {
            Ok(builder) => {
                debug!("Using system DNS configuration");
                builder
            }
            Err(e) => {
                warn!(error = %e, "Failed to read system DNS config, using defaults");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };

        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        builder.options_mut().attempts = 1;

        Self {
            resolver: builder.build(),
        }
    }
}

#[async_trait]
impl Resolve for HickoryResolver {
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, RoutesError> {
        debug!(domain = %domain, "Resolving via hickory-dns");

        let lookup = self
            .resolver
            .lookup_ip(domain)
            .await
            .map_err(|e| RoutesError::Resolution {
                operation: "lookup_ip",
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;

        Ok(lookup.iter().collect())
    }
}

/// Resolve `domain` and keep only its IPv4 addresses.
///
/// # Errors
///
/// Propagates the resolver's [`RoutesError::Resolution`] unchanged.
pub async fn resolve_ipv4(
    resolver: &dyn Resolve,
    domain: &str,
) -> Result<Vec<Ipv4Addr>, RoutesError> {
    let addresses = resolver.lookup_ip(domain).await?;

    let mut ipv4 = Vec::with_capacity(addresses.len());
    for address in addresses {
        match as_ipv4(address) {
            Some(v4) => ipv4.push(v4),
            None => {
                info!(domain = %domain, address = %address, "{address} is IPv6, skipping");
                metrics::record_ipv6_skipped();
            }
        }
    }

    debug!(domain = %domain, count = ipv4.len(), "Resolved IPv4 addresses");
    metrics::record_domain_resolved();

    Ok(ipv4)
}

/// The 4-byte form of `address`, if it has one.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
#[must_use]
pub fn as_ipv4(address: IpAddr) -> Option<Ipv4Addr> {
    match address {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
