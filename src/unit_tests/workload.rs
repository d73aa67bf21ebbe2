// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::resolver::rules::first_match;
use crate::resolver::workload::*;
use crate::unit_tests::timestamp;

fn instance(name: &str, image: &str) -> RunningInstance {
    RunningInstance {
        name: name.to_string(),
        images: vec![image.to_string()],
        ..RunningInstance::default()
    }
}

fn instances(count: usize, image: &str) -> Vec<RunningInstance> {
    (0..count)
        .map(|i| instance(&format!("web-{}", i), image))
        .collect()
}

fn service(deployed: ReplicaSettings, configured: Option<ReplicaSettings>) -> DesiredComponentConfig {
    DesiredComponentConfig {
        deployed,
        configured,
        ..DesiredComponentConfig::new("web", ComponentKind::Service, "web:2")
    }
}

fn job_scheduler() -> DesiredComponentConfig {
    DesiredComponentConfig::new("compute", ComponentKind::Job, "compute:2")
}

fn with_restart(mut desired: DesiredComponentConfig, raw: &str) -> DesiredComponentConfig {
    desired
        .environment_variables
        .insert(RESTART_ENV_VAR.to_string(), raw.to_string());
    desired
}

fn never_reconciled() -> ReconciliationMarker {
    ReconciliationMarker::default()
}

#[test]
pub fn test_expected_range() {
    assert_eq!(ReplicaSettings::default().expected_range(), 1..=1);
    assert_eq!(ReplicaSettings::fixed(3).expected_range(), 3..=3);
    assert_eq!(ReplicaSettings::fixed(0).expected_range(), 0..=0);
    assert_eq!(ReplicaSettings::scaled(Some(2), 5).expected_range(), 2..=5);
    assert_eq!(ReplicaSettings::scaled(None, 5).expected_range(), 1..=5);
    assert_eq!(ReplicaSettings::scaled(Some(0), 5).expected_range(), 0..=5);
    let stopped_with_scaling = ReplicaSettings {
        replicas: Some(0),
        ..ReplicaSettings::scaled(Some(2), 5)
    };
    assert_eq!(stopped_with_scaling.expected_range(), 0..=0);
    // A fixed count is ignored once scaling bounds exist, unless it is zero.
    let scaled_with_count = ReplicaSettings {
        replicas: Some(7),
        ..ReplicaSettings::scaled(Some(2), 5)
    };
    assert_eq!(scaled_with_count.expected_range(), 2..=5);
}

#[test]
pub fn test_negative_counts_clamp_to_zero() {
    assert_eq!(ReplicaSettings::fixed(-1).expected_range(), 0..=0);
    assert!(!ReplicaSettings::scaled(Some(3), 2).accepts(2));
}

#[test]
pub fn test_consistent_when_replicas_and_images_match() {
    let desired = service(ReplicaSettings::fixed(2), Some(ReplicaSettings::fixed(2)));
    let status = resolve_component(&desired, &instances(2, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

#[test]
pub fn test_stopped_when_running_generation_scaled_to_zero() {
    // The stop operation writes zero replicas onto the running generation; configuration still says 2.
    let desired = service(ReplicaSettings::fixed(0), Some(ReplicaSettings::fixed(2)));
    let status = resolve_component(&desired, &[], &never_reconciled());
    assert_eq!(status, ComponentStatus::Stopped);
}

#[test]
pub fn test_outdated_when_one_instance_runs_older_image() {
    let desired = service(ReplicaSettings::fixed(2), Some(ReplicaSettings::fixed(2)));
    let running = vec![instance("web-0", "web:2"), instance("web-1", "web:1")];
    let status = resolve_component(&desired, &running, &never_reconciled());
    assert_eq!(status, ComponentStatus::Outdated);
}

#[test]
pub fn test_reconciling_while_instances_are_missing() {
    let desired = service(ReplicaSettings::fixed(2), Some(ReplicaSettings::fixed(2)));
    assert_eq!(
        resolve_component(&desired, &[], &never_reconciled()),
        ComponentStatus::Reconciling
    );
    assert_eq!(
        resolve_component(&desired, &instances(1, "web:2"), &never_reconciled()),
        ComponentStatus::Reconciling
    );
}

#[test]
pub fn test_reconciling_with_surplus_instances() {
    let desired = service(ReplicaSettings::fixed(1), None);
    let status = resolve_component(&desired, &instances(2, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Reconciling);
}

#[test]
pub fn test_reconciling_while_stop_is_rolling_out() {
    // Configuration asks for 2, running generation asks for 0, but an instance is still up.
    let desired = service(ReplicaSettings::fixed(0), Some(ReplicaSettings::fixed(2)));
    let status = resolve_component(&desired, &instances(1, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Reconciling);
}

#[test]
pub fn test_zero_in_configuration_and_generation_is_consistent() {
    let desired = service(ReplicaSettings::fixed(0), Some(ReplicaSettings::fixed(0)));
    let status = resolve_component(&desired, &[], &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

#[test]
pub fn test_unset_replicas_expect_default() {
    let desired = service(ReplicaSettings::default(), None);
    assert_eq!(
        resolve_component(&desired, &instances(1, "web:2"), &never_reconciled()),
        ComponentStatus::Consistent
    );
    assert_eq!(
        resolve_component(&desired, &[], &never_reconciled()),
        ComponentStatus::Reconciling
    );
}

#[test]
pub fn test_horizontal_scaling_bounds() {
    let desired = service(
        ReplicaSettings::scaled(Some(2), 4),
        Some(ReplicaSettings::scaled(Some(2), 4)),
    );
    assert_eq!(
        resolve_component(&desired, &instances(3, "web:2"), &never_reconciled()),
        ComponentStatus::Consistent
    );
    assert_eq!(
        resolve_component(&desired, &instances(5, "web:2"), &never_reconciled()),
        ComponentStatus::Reconciling
    );
    assert_eq!(
        resolve_component(&desired, &instances(1, "web:2"), &never_reconciled()),
        ComponentStatus::Reconciling
    );
}

#[test]
pub fn test_stopped_with_scaling_bounds() {
    let deployed = ReplicaSettings {
        replicas: Some(0),
        ..ReplicaSettings::scaled(Some(2), 4)
    };
    let desired = service(deployed, Some(ReplicaSettings::scaled(Some(2), 4)));
    let status = resolve_component(&desired, &[], &never_reconciled());
    assert_eq!(status, ComponentStatus::Stopped);
}

#[test]
pub fn test_terminating_instance_with_old_image_is_ignored() {
    let desired = service(ReplicaSettings::fixed(2), Some(ReplicaSettings::fixed(2)));
    let mut old = instance("web-1", "web:1");
    old.terminating = true;
    let running = vec![instance("web-0", "web:2"), old];
    let status = resolve_component(&desired, &running, &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

#[test]
pub fn test_restarting_when_never_reconciled() {
    let desired = with_restart(
        service(ReplicaSettings::fixed(1), None),
        "2024-05-02T10:00:00Z",
    );
    let status = resolve_component(&desired, &instances(1, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Restarting);
}

#[test]
pub fn test_restarting_until_reconciled_after_request() {
    let desired = with_restart(
        service(ReplicaSettings::fixed(1), None),
        "2024-05-02T10:00:00Z",
    );
    let running = instances(1, "web:2");
    let before = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T09:00:00Z")),
    };
    let after = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T11:00:00Z")),
    };
    let same = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T10:00:00Z")),
    };
    assert_eq!(
        resolve_component(&desired, &running, &before),
        ComponentStatus::Restarting
    );
    assert_eq!(
        resolve_component(&desired, &running, &after),
        ComponentStatus::Consistent
    );
    assert_eq!(
        resolve_component(&desired, &running, &same),
        ComponentStatus::Consistent
    );
}

#[test]
pub fn test_restart_timestamp_with_offset() {
    let desired = with_restart(
        service(ReplicaSettings::fixed(1), None),
        "2024-05-02T12:00:00+02:00",
    );
    let reconciled = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T09:30:00Z")),
    };
    assert_eq!(
        resolve_component(&desired, &instances(1, "web:2"), &reconciled),
        ComponentStatus::Restarting
    );
}

#[test]
pub fn test_malformed_restart_timestamp_is_ignored() {
    let desired = with_restart(service(ReplicaSettings::fixed(1), None), "yesterday");
    assert_eq!(desired.restart_requested_at(), None);
    let status = resolve_component(&desired, &instances(1, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

#[test]
pub fn test_empty_restart_timestamp_is_ignored() {
    let desired = with_restart(service(ReplicaSettings::fixed(1), None), "");
    let status = resolve_component(&desired, &instances(1, "web:2"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

fn restarted_instance(name: &str, raw: &str) -> RunningInstance {
    let mut running = instance(name, "web:2");
    running
        .environment_variables
        .insert(RESTART_ENV_VAR.to_string(), raw.to_string());
    running
}

#[test]
pub fn test_restart_stamp_carried_by_instances_only() {
    let desired = service(ReplicaSettings::fixed(1), None);
    let running = vec![restarted_instance("web-0", "2024-05-02T10:00:00Z")];
    assert_eq!(
        resolve_component(&desired, &running, &never_reconciled()),
        ComponentStatus::Restarting
    );
    let reconciled = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T11:00:00Z")),
    };
    assert_eq!(
        resolve_component(&desired, &running, &reconciled),
        ComponentStatus::Consistent
    );
}

#[test]
pub fn test_malformed_restart_stamp_on_instance_is_ignored() {
    let desired = service(ReplicaSettings::fixed(1), None);
    let running = vec![restarted_instance("web-0", "not-a-time")];
    assert_eq!(running[0].restart_requested_at(), None);
    assert_eq!(
        resolve_component(&desired, &running, &never_reconciled()),
        ComponentStatus::Consistent
    );
}

#[test]
pub fn test_latest_instance_restart_stamp_wins() {
    let desired = service(ReplicaSettings::fixed(2), None);
    let running = vec![
        restarted_instance("web-0", "2024-05-02T09:00:00Z"),
        restarted_instance("web-1", "2024-05-02T12:00:00Z"),
    ];
    let reconciled = ReconciliationMarker {
        reconciled_at: Some(timestamp("2024-05-02T10:00:00Z")),
    };
    assert_eq!(
        resolve_component(&desired, &running, &reconciled),
        ComponentStatus::Restarting
    );
}

#[test]
pub fn test_terminating_instance_restart_stamp_is_ignored() {
    let desired = service(ReplicaSettings::fixed(2), None);
    let mut old = restarted_instance("web-0", "2024-05-02T10:00:00Z");
    old.terminating = true;
    let running = vec![old, instance("web-1", "web:2")];
    assert_eq!(
        resolve_component(&desired, &running, &never_reconciled()),
        ComponentStatus::Consistent
    );
}

#[test]
pub fn test_outdated_outranks_restart() {
    let desired = with_restart(
        service(ReplicaSettings::fixed(1), None),
        "2024-05-02T10:00:00Z",
    );
    let status = resolve_component(&desired, &instances(1, "web:1"), &never_reconciled());
    assert_eq!(status, ComponentStatus::Outdated);
}

#[test]
pub fn test_job_scheduler_without_instances_is_stopped() {
    let status = resolve_component(&job_scheduler(), &[], &never_reconciled());
    assert_eq!(status, ComponentStatus::Stopped);
}

#[test]
pub fn test_job_scheduler_skips_replica_and_image_checks() {
    let running = vec![instance("compute-0", "compute:1"), instance("compute-1", "compute:1")];
    let status = resolve_component(&job_scheduler(), &running, &never_reconciled());
    assert_eq!(status, ComponentStatus::Consistent);
}

#[test]
pub fn test_job_scheduler_restarting() {
    let desired = with_restart(job_scheduler(), "2024-05-02T10:00:00Z");
    let running = vec![instance("compute-0", "compute:2")];
    assert_eq!(
        resolve_component(&desired, &running, &never_reconciled()),
        ComponentStatus::Restarting
    );
}

#[test]
pub fn test_service_rule_order() {
    let names: Vec<&str> = service_rules().iter().map(|rule| rule.name).collect();
    assert_eq!(
        names,
        vec!["scaled-to-zero", "replica-mismatch", "outdated-image", "pending-restart"]
    );
    let names: Vec<&str> = job_rules().iter().map(|rule| rule.name).collect();
    assert_eq!(names, vec!["job-scheduler-stopped", "pending-restart"]);
}

#[test]
pub fn test_first_matching_service_rule_is_reported() {
    let desired = service(ReplicaSettings::fixed(2), None);
    let running = instances(1, "web:1");
    let reconciled = never_reconciled();
    let observation = WorkloadObservation {
        desired: &desired,
        running: &running,
        reconciled: &reconciled,
    };
    let matched = first_match(&service_rules(), &observation);
    assert_eq!(
        matched,
        Some(("replica-mismatch", ComponentStatus::Reconciling))
    );
    assert_eq!(outdated_image(&observation), Some(ComponentStatus::Outdated));
    assert_eq!(pending_restart(&observation), None);
}

#[test]
pub fn test_status_wire_strings() {
    let all = [
        (ComponentStatus::Stopped, "Stopped"),
        (ComponentStatus::Consistent, "Consistent"),
        (ComponentStatus::Reconciling, "Reconciling"),
        (ComponentStatus::Restarting, "Restarting"),
        (ComponentStatus::Outdated, "Outdated"),
    ];
    for (status, wire) in all {
        assert_eq!(status.to_string(), wire);
        assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{}\"", wire));
    }
}
