// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types exchanged with the network controller.

use serde::{Deserialize, Deserializer, Serialize};

/// A route entry as the controller stores it.
///
/// `target` is a prefix string. `via` names the next hop and is omitted for
/// routes that are directly reachable (address pool aggregates, LAN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRoute {
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

impl RemoteRoute {
    /// A directly reachable route with no next hop.
    #[must_use]
    pub fn direct(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            via: None,
        }
    }

    /// A route through the given next hop.
    #[must_use]
    pub fn via(target: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            via: Some(via.into()),
        }
    }
}

/// An address-assignment pool reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPool {
    #[serde(rename = "ipRangeStart")]
    pub range_start: String,

    #[serde(rename = "ipRangeEnd")]
    pub range_end: String,
}

impl AddressPool {
    #[must_use]
    pub fn new(range_start: impl Into<String>, range_end: impl Into<String>) -> Self {
        Self {
            range_start: range_start.into(),
            range_end: range_end.into(),
        }
    }
}

/// The subset of `GET /network/{id}` this crate reads.
#[derive(Debug, Deserialize)]
pub(crate) struct NetworkResponse {
    pub config: NetworkResponseConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkResponseConfig {
    /// `null` means no pools
    #[serde(rename = "ipAssignmentPools", deserialize_with = "null_as_empty")]
    pub ip_assignment_pools: Vec<AddressPool>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AddressPool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<AddressPool>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /network/{id}` replacing the route table.
#[derive(Debug, Serialize)]
pub(crate) struct RoutesUpdate<'a> {
    pub config: RoutesUpdateConfig<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoutesUpdateConfig<'a> {
    pub routes: &'a [RemoteRoute],
}

impl<'a> RoutesUpdate<'a> {
    pub(crate) fn new(routes: &'a [RemoteRoute]) -> Self {
        Self {
            config: RoutesUpdateConfig { routes },
        }
    }
}
