// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use zt_routes::config::{routes_file_path, save_routes_config, ConfigFormat, Group, Route};
use zt_routes::errors::RoutesError;
use zt_routes::resolver::Resolve;

pub const NETWORK_ID: &str = "8056c2e21c000001";
pub const TOKEN: &str = "integration-token";
pub const EXIT_NODE: &str = "10.147.20.1";

/// Resolver answering from a fixed table; unknown domains fail like NXDOMAIN.
pub struct StubResolver {
    answers: HashMap<String, Vec<IpAddr>>,
}

impl StubResolver {
    pub fn new(answers: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|(domain, ips)| {
                    (
                        domain.to_string(),
                        ips.iter().map(|ip| ip.parse().unwrap()).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Resolve for StubResolver {
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, RoutesError> {
        self.answers
            .get(domain)
            .cloned()
            .ok_or_else(|| RoutesError::Resolution {
                operation: "lookup_ip",
                domain: domain.to_string(),
                reason: "no record found".to_string(),
            })
    }
}

/// An enabled group routed through [`EXIT_NODE`] with unresolved domains.
pub fn default_group(domains: &[&str]) -> Group {
    Group {
        name: "default".to_string(),
        enabled: true,
        exit_node: Some(EXIT_NODE.to_string()),
        routes: domains.iter().map(|domain| Route::unresolved(*domain)).collect(),
    }
}

/// Write `groups` as the routes file of [`NETWORK_ID`] in a fresh temp directory.
pub async fn routes_dir_with(groups: &[Group]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = routes_file_path(dir.path(), NETWORK_ID);
    save_routes_config(groups, &path, ConfigFormat::Json)
        .await
        .unwrap();
    (dir, path)
}
