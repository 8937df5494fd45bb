// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `phase.rs`

#[cfg(test)]
mod tests {
    use super::super::{plan, Observation, Phase, Step};
    use crate::crd::ResourceStatus;
    use crate::reconcilers::status::create_condition;

    const NOW: &str = "2025-01-01T00:00:00+00:00";

    fn observation(generation: i64) -> Observation {
        Observation {
            generation,
            ..Default::default()
        }
    }

    fn created(generation: i64, running: bool) -> ResourceStatus {
        ResourceStatus {
            conditions: vec![create_condition(
                "Running",
                if running { "True" } else { "False" },
                if running { "Running" } else { "Provisioning" },
                "",
                NOW,
            )],
            id: Some("orders-db".to_string()),
            observed_generation: Some(generation),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_record_creates() {
        assert_eq!(plan(&ResourceStatus::default(), &observation(1), false), Step::Create);
    }

    #[test]
    fn test_missing_id_recreates() {
        let mut status = created(1, true);
        status.id = None;
        assert_eq!(plan(&status, &observation(1), false), Step::Create);
    }

    #[test]
    fn test_deletion_wins_over_everything() {
        let mut status = created(1, true);
        status.failed_generation = Some(1);
        let obs = Observation {
            generation: 1,
            deletion_requested: true,
            source_fingerprint: None,
        };
        assert_eq!(plan(&status, &obs, false), Step::Delete);
    }

    #[test]
    fn test_generation_change_updates_or_replaces() {
        let status = created(1, true);
        assert_eq!(plan(&status, &observation(2), false), Step::Update);
        assert_eq!(plan(&status, &observation(2), true), Step::Replace);
    }

    #[test]
    fn test_converged_record_is_observed() {
        assert_eq!(plan(&created(3, true), &observation(3), false), Step::Observe);
        assert_eq!(plan(&created(3, false), &observation(3), false), Step::AwaitReady);
    }

    #[test]
    fn test_source_fingerprint_change_updates() {
        let mut status = created(1, true);
        status.source_fingerprint = Some("old".to_string());

        let obs = Observation {
            generation: 1,
            deletion_requested: false,
            source_fingerprint: Some("new".to_string()),
        };
        // Fingerprint changes are applied in place, even for replace kinds.
        assert_eq!(plan(&status, &obs, false), Step::Update);
        assert_eq!(plan(&status, &obs, true), Step::Update);

        let same = Observation {
            source_fingerprint: Some("old".to_string()),
            ..obs
        };
        assert_eq!(plan(&status, &same, false), Step::Observe);
    }

    #[test]
    fn test_terminal_failure_blocks_same_generation() {
        let status = ResourceStatus {
            failed_generation: Some(4),
            conditions: vec![create_condition("Error", "True", "Rejected", "bad plan", NOW)],
            ..Default::default()
        };

        assert_eq!(plan(&status, &observation(4), false), Step::Blocked);
        assert_eq!(plan(&status, &observation(5), false), Step::Create);
    }

    #[test]
    fn test_dependency_missing_is_not_blocked() {
        let status = ResourceStatus {
            failed_generation: Some(1),
            conditions: vec![create_condition(
                "Error",
                "True",
                "DependencyMissing",
                "service orders-db not found",
                NOW,
            )],
            ..Default::default()
        };

        assert_eq!(plan(&status, &observation(1), false), Step::Create);
    }

    #[test]
    fn test_phase_derivation() {
        assert_eq!(Phase::of(&ResourceStatus::default(), false), Phase::Pending);
        assert_eq!(Phase::of(&created(1, false), false), Phase::Provisioning);
        assert_eq!(Phase::of(&created(1, true), false), Phase::Running);
        assert_eq!(Phase::of(&created(1, true), true), Phase::Deleting);

        let mut degraded = created(1, true);
        degraded
            .conditions
            .push(create_condition("Error", "True", "RetryLater", "busy", NOW));
        assert_eq!(Phase::of(&degraded, false), Phase::Degraded);
        assert_eq!(Phase::Gone.to_string(), "Gone");
    }
}
