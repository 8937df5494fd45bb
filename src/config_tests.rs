// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use super::super::{OperatorConfig, ReconcileSettings};
    use clap::Parser;
    use std::time::Duration;

    fn parse(args: &[&str]) -> OperatorConfig {
        let mut argv = vec!["msop", "--api-token", "test-token"];
        argv.extend_from_slice(args);
        OperatorConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.api_url, "https://api.aiven.io/v1");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.ready_requeue_secs, 300);
        assert_eq!(config.creation_timeout_secs, 1200);
        assert_eq!(config.deletion_timeout_secs, 600);
        assert_eq!(config.max_transient_failures, 10);
        assert_eq!(config.metrics_port, 8080);
        assert!(!config.leader_election);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_match_default_settings() {
        assert_eq!(parse(&[]).settings(), ReconcileSettings::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--poll-interval-secs",
            "5",
            "--creation-timeout-secs",
            "60",
            "--leader-election",
        ]);
        let settings = config.settings();
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.creation_timeout, Duration::from_secs(60));
        assert!(config.leader_election);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = parse(&["--poll-interval-secs", "0"]);
        let err = config.validate().unwrap_err();
        assert!(err.contains("poll-interval-secs"));
    }

    #[test]
    fn test_validate_rejects_poll_longer_than_timeout() {
        let config = parse(&[
            "--poll-interval-secs",
            "120",
            "--deletion-timeout-secs",
            "60",
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.contains("deletion-timeout-secs"));
    }

    #[test]
    fn test_validate_rejects_blank_token() {
        let config = OperatorConfig::try_parse_from(["msop", "--api-token", "  "]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_identity_wins() {
        let config = parse(&["--identity", "msop-0"]);
        assert_eq!(config.leader_identity(), "msop-0");
    }
}
