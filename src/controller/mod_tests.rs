// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for controller client construction and wire types.

#[cfg(test)]
mod tests {
    use crate::controller::types::{NetworkResponse, RoutesUpdate};
    use crate::controller::{AddressPool, ControllerClient, RemoteRoute};
    use crate::errors::RoutesError;
    use serde_json::json;

    // =====================================================
    // Base URL Tests
    // =====================================================

    #[test]
    fn test_base_url_kept_as_is() {
        let client = ControllerClient::new("https://api.zerotier.com/api/v1").unwrap();
        assert_eq!(client.base_url(), "https://api.zerotier.com/api/v1");
    }

    #[test]
    fn test_base_url_trailing_slashes_removed() {
        let client = ControllerClient::new("http://localhost:9993///").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9993");
    }

    #[test]
    fn test_network_url() {
        let client = ControllerClient::new("https://api.zerotier.com/api/v1/").unwrap();
        assert_eq!(
            client.network_url("8056c2e21c000001"),
            "https://api.zerotier.com/api/v1/network/8056c2e21c000001"
        );
    }

    #[test]
    fn test_base_url_without_scheme_rejected() {
        let err = ControllerClient::new("api.zerotier.com").unwrap_err();
        assert!(matches!(err, RoutesError::Config { .. }));
    }

    #[test]
    fn test_base_url_unsupported_scheme_rejected() {
        let err = ControllerClient::new("ftp://api.zerotier.com").unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    // =====================================================
    // Wire Type Tests
    // =====================================================

    #[test]
    fn test_direct_route_omits_via() {
        let value = serde_json::to_value(RemoteRoute::direct("10.147.17.0/24")).unwrap();
        assert_eq!(value, json!({"target": "10.147.17.0/24"}));
    }

    #[test]
    fn test_host_route_serializes_via() {
        let value =
            serde_json::to_value(RemoteRoute::via("203.0.113.9/32", "198.51.100.1")).unwrap();
        assert_eq!(
            value,
            json!({"target": "203.0.113.9/32", "via": "198.51.100.1"})
        );
    }

    #[test]
    fn test_route_without_via_deserializes() {
        let route: RemoteRoute = serde_json::from_value(json!({"target": "10.0.0.0/8"})).unwrap();
        assert_eq!(route, RemoteRoute::direct("10.0.0.0/8"));
    }

    #[test]
    fn test_routes_update_shape() {
        let routes = vec![
            RemoteRoute::direct("10.147.17.1/24"),
            RemoteRoute::via("93.184.216.34/32", "10.147.17.10"),
        ];

        let value = serde_json::to_value(RoutesUpdate::new(&routes)).unwrap();
        assert_eq!(
            value,
            json!({
                "config": {
                    "routes": [
                        {"target": "10.147.17.1/24"},
                        {"target": "93.184.216.34/32", "via": "10.147.17.10"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_network_response_ignores_unknown_fields() {
        let response: NetworkResponse = serde_json::from_value(json!({
            "id": "8056c2e21c000001",
            "config": {
                "name": "home",
                "private": true,
                "ipAssignmentPools": [
                    {"ipRangeStart": "10.147.17.1", "ipRangeEnd": "10.147.17.254"}
                ],
                "routes": []
            }
        }))
        .unwrap();

        assert_eq!(
            response.config.ip_assignment_pools,
            vec![AddressPool::new("10.147.17.1", "10.147.17.254")]
        );
    }

    #[test]
    fn test_network_response_requires_pools() {
        let result: Result<NetworkResponse, _> =
            serde_json::from_value(json!({"config": {"name": "home"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_network_response_null_pools_are_empty() {
        let response: NetworkResponse =
            serde_json::from_value(json!({"config": {"ipAssignmentPools": null}})).unwrap();

        assert!(response.config.ip_assignment_pools.is_empty());
    }
}
