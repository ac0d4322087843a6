// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for configuration loading and saving.

#[cfg(test)]
mod tests {
    use crate::config::{
        add_domains, add_to_routes_file, clone_routes_file, decode, default_exit_node, encode,
        load_network_config, load_routes_config, routes_file_path, save_network_config,
        save_routes_config, ConfigFormat, Group, NetworkConfig, Route, RoutesConfig,
    };
    use crate::controller::RemoteRoute;
    use crate::errors::RoutesError;
    use std::path::Path;

    fn sample_groups() -> RoutesConfig {
        vec![
            Group {
                name: "default".to_string(),
                enabled: true,
                exit_node: Some("10.147.20.1".to_string()),
                routes: vec![Route {
                    domain: "example.test".to_string(),
                    ips: vec!["93.184.216.34".to_string()],
                }],
            },
            Group {
                name: "archive".to_string(),
                enabled: false,
                exit_node: None,
                routes: vec![Route::unresolved("old.test")],
            },
        ]
    }

    #[test]
    fn test_json_encoding_is_tab_indented() {
        let text = encode(&sample_groups(), ConfigFormat::Json).unwrap();

        assert!(text.contains("\n\t{"));
        assert!(text.contains("\t\t\"group\": \"default\""));
    }

    #[test]
    fn test_disabled_flag_is_omitted() {
        let text = encode(&sample_groups(), ConfigFormat::Json).unwrap();

        assert_eq!(text.matches("isEnabled").count(), 1);
        assert!(text.contains("\"isEnabled\": true"));
    }

    #[test]
    fn test_missing_routes_field_defaults_to_empty() {
        let groups: RoutesConfig = decode(
            r#"[{"group": "default", "isEnabled": true}]"#,
            ConfigFormat::Json,
            Path::new("test.routes.json"),
        )
        .unwrap();

        assert!(groups[0].enabled);
        assert!(groups[0].routes.is_empty());
    }

    #[test]
    fn test_enabled_alias_is_accepted() {
        let groups: RoutesConfig = decode(
            r#"[{"group": "default", "enabled": true, "routes": []}]"#,
            ConfigFormat::Json,
            Path::new("test.routes.json"),
        )
        .unwrap();

        assert!(groups[0].enabled);
    }

    #[test]
    fn test_relaxed_format_reads_quoteless_hjson() {
        let text = r#"{
  networkId: 8056c2e21c000001
  exitNode: 10.147.17.5
  lan: 192.168.1.0/24
  apps:
  [
    {
      name: video
      domains:
      [
        video.test
      ]
      routes:
      [
        {
          target: 203.0.113.9/32
          via: 10.147.17.5
        }
      ]
    }
  ]
}
"#;

        let network: NetworkConfig =
            decode(text, ConfigFormat::Relaxed, Path::new("zt_routes.hjson")).unwrap();

        assert_eq!(network.network_id, "8056c2e21c000001");
        assert_eq!(network.exit_node, "10.147.17.5");
        assert_eq!(network.lan, "192.168.1.0/24");
        assert_eq!(network.apps[0].domains, vec!["video.test"]);
        assert!(network.apps[0].ips.is_empty());
        assert_eq!(
            network.apps[0].routes,
            vec![RemoteRoute::via("203.0.113.9/32", "10.147.17.5")]
        );
    }

    #[test]
    fn test_relaxed_format_tolerates_comments_and_trailing_commas() {
        let text = r#"{
  # managed by zt-routes
  "networkId": "8056c2e21c000001",
  // exit node
  "exitNode": "10.147.17.5",
  /* office LAN */
  "lan": "192.168.1.0/24",
  "apps": [],
}
"#;

        let network: NetworkConfig =
            decode(text, ConfigFormat::Relaxed, Path::new("zt_routes.hjson")).unwrap();

        assert_eq!(network.exit_node, "10.147.17.5");
        assert_eq!(network.lan, "192.168.1.0/24");
        assert!(network.apps.is_empty());
    }

    #[test]
    fn test_relaxed_encoding_is_indented_json() {
        let network = NetworkConfig {
            network_id: "abc".to_string(),
            exit_node: "10.0.0.1".to_string(),
            lan: "10.0.0.0/24".to_string(),
            apps: Vec::new(),
        };

        let text = encode(&network, ConfigFormat::Relaxed).unwrap();

        assert!(text.contains("\n  \"networkId\": \"abc\""));
        let reparsed: NetworkConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, network);
    }

    #[test]
    fn test_relaxed_format_accepts_plain_json() {
        let network: NetworkConfig = decode(
            r#"{"networkId": "abc", "exitNode": "10.0.0.1", "lan": "10.0.0.0/24"}"#,
            ConfigFormat::Relaxed,
            Path::new("zt_routes.hjson"),
        )
        .unwrap();

        assert_eq!(network.lan, "10.0.0.0/24");
    }

    #[test]
    fn test_decode_error_names_path() {
        let err = decode::<RoutesConfig>(
            "{not json",
            ConfigFormat::Json,
            Path::new("bad.routes.json"),
        )
        .unwrap_err();

        assert!(matches!(err, RoutesError::Decode { .. }));
        assert!(err.to_string().contains("bad.routes.json"));
    }

    #[test]
    fn test_default_exit_node_comes_from_first_group() {
        assert_eq!(default_exit_node(&sample_groups()), Some("10.147.20.1"));
        assert_eq!(default_exit_node(&[]), None);

        let mut groups = sample_groups();
        groups.reverse();
        assert_eq!(default_exit_node(&groups), None);
    }

    #[test]
    fn test_routes_file_path() {
        let path = routes_file_path("/etc/zt", "8056c2e21c000001");
        assert_eq!(path, Path::new("/etc/zt/8056c2e21c000001.routes.json"));
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut network = NetworkConfig::default();
        assert_eq!(
            network.validate().unwrap_err().to_string(),
            "validate_network_config: Network ID is required"
        );

        network.network_id = "abc".to_string();
        assert_eq!(
            network.validate().unwrap_err().to_string(),
            "validate_network_config: Exit Node address is required"
        );

        network.exit_node = "10.0.0.1".to_string();
        assert_eq!(
            network.validate().unwrap_err().to_string(),
            "validate_network_config: LAN is required"
        );

        network.lan = "10.0.0.0/24".to_string();
        assert!(network.validate().is_ok());
    }

    #[test]
    fn test_add_domains_creates_group_and_skips_duplicates() {
        let mut groups = sample_groups();

        let added = add_domains(
            &mut groups,
            "office",
            &["a.test".to_string(), "a.test".to_string(), "b.test".to_string()],
        );

        assert_eq!(added, 2);
        let office = groups.last().unwrap();
        assert_eq!(office.name, "office");
        assert!(office.enabled);
        assert_eq!(office.routes, vec![Route::unresolved("a.test"), Route::unresolved("b.test")]);
    }

    #[test]
    fn test_add_domains_appends_to_existing_group() {
        let mut groups = sample_groups();

        let added = add_domains(
            &mut groups,
            "default",
            &["example.test".to_string(), "new.test".to_string()],
        );

        assert_eq!(added, 1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].routes.len(), 2);
        assert_eq!(groups[0].routes[0].ips, vec!["93.184.216.34"]);
    }

    #[tokio::test]
    async fn test_routes_file_round_trip_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.routes.json");

        save_routes_config(&sample_groups(), &path, ConfigFormat::Json)
            .await
            .unwrap();
        save_routes_config(&sample_groups()[..1], &path, ConfigFormat::Json)
            .await
            .unwrap();

        let groups = load_routes_config(&path, ConfigFormat::Json).await.unwrap();
        assert_eq!(groups, sample_groups()[..1].to_vec());
    }

    #[tokio::test]
    async fn test_network_file_round_trip_in_relaxed_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zt_routes.hjson");
        let network = NetworkConfig {
            network_id: "8056c2e21c000001".to_string(),
            exit_node: "10.147.20.1".to_string(),
            lan: "192.168.1.0/24".to_string(),
            apps: Vec::new(),
        };

        save_network_config(&network, &path, ConfigFormat::Relaxed)
            .await
            .unwrap();

        let loaded = load_network_config(&path, ConfigFormat::Relaxed).await.unwrap();
        assert_eq!(loaded, network);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_routes_config(&dir.path().join("absent.routes.json"), ConfigFormat::Json)
            .await
            .unwrap_err();

        assert!(matches!(err, RoutesError::Io { .. }));
        assert_eq!(err.operation(), "load_config");
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("net.routes.json");

        let err = save_routes_config(&sample_groups(), &path, ConfigFormat::Json)
            .await
            .unwrap_err();

        assert!(matches!(err, RoutesError::Io { .. }));
    }

    #[tokio::test]
    async fn test_add_to_missing_routes_file_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.routes.json");

        let domains = ["a.test".to_string()];
        let added = add_to_routes_file(&path, "default", &domains, ConfigFormat::Json)
            .await
            .unwrap();

        assert_eq!(added, 1);
        let groups = load_routes_config(&path, ConfigFormat::Json).await.unwrap();
        assert_eq!(groups[0].name, "default");
        assert_eq!(groups[0].routes, vec![Route::unresolved("a.test")]);
    }

    #[tokio::test]
    async fn test_add_requires_domains() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.routes.json");

        let err = add_to_routes_file(&path, "default", &[], ConfigFormat::Json)
            .await
            .unwrap_err();

        assert!(matches!(err, RoutesError::Config { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_add_fails_when_routes_file_cannot_be_checked() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("net.routes.json");

        let domains = ["a.test".to_string()];
        let err = add_to_routes_file(&path, "default", &domains, ConfigFormat::Json)
            .await
            .unwrap_err();

        assert!(matches!(err, RoutesError::Io { .. }));
        assert_eq!(err.operation(), "add");
    }

    #[tokio::test]
    async fn test_clone_copies_source_over_destination() {
        let dir = tempfile::tempdir().unwrap();
        save_routes_config(
            &sample_groups(),
            &routes_file_path(dir.path(), "src"),
            ConfigFormat::Json,
        )
        .await
        .unwrap();
        save_routes_config(
            &[Group::default()],
            &routes_file_path(dir.path(), "dest"),
            ConfigFormat::Json,
        )
        .await
        .unwrap();

        let cloned = clone_routes_file(dir.path(), "src", "dest", ConfigFormat::Json)
            .await
            .unwrap();

        let dest = load_routes_config(&routes_file_path(dir.path(), "dest"), ConfigFormat::Json)
            .await
            .unwrap();
        assert_eq!(dest, sample_groups());
        assert_eq!(cloned, dest);
    }

    #[tokio::test]
    async fn test_clone_rejects_empty_arguments() {
        let dir = tempfile::tempdir().unwrap();

        let err = clone_routes_file(dir.path(), "", "dest", ConfigFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "clone: source can not be empty");

        let err = clone_routes_file(dir.path(), "src", "", ConfigFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "clone: destination can not be empty");
    }
}
