// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::*;
use crate::kubernetes_api_objects::deployment::{active_deployment, environment_config, is_active};
use crate::resolver::workload::{
    ComponentKind, DesiredComponentConfig, ReconciliationMarker, ReplicaSettings,
};
use crate::unit_tests::timestamp;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;

fn time(raw: &str) -> Time {
    Time(timestamp(raw))
}

fn deployment(name: &str, condition: &str, active_from: Option<&str>) -> WorkloadDeployment {
    let mut deployment = WorkloadDeployment::new(name, WorkloadDeploymentSpec::default());
    deployment.status = Some(WorkloadDeploymentStatus {
        condition: Some(condition.to_string()),
        reconciled: None,
        active_from: active_from.map(time),
    });
    deployment
}

#[test]
pub fn test_desired_component_from_kube() {
    let component = DeployComponent {
        name: "web".to_string(),
        image: "web:2".to_string(),
        replicas: Some(0),
        environment_variables: BTreeMap::from([(
            "WORKLOAD_RESTART".to_string(),
            "2024-05-02T10:00:00Z".to_string(),
        )]),
        ..DeployComponent::default()
    };
    let config = ComponentEnvironmentConfig {
        environment: "prod".to_string(),
        replicas: None,
        horizontal_scaling: Some(HorizontalScalingSpec {
            min_replicas: Some(2),
            max_replicas: 4,
        }),
    };
    let desired = DesiredComponentConfig::from_kube(&component, Some(&config));
    assert_eq!(desired.kind, ComponentKind::Service);
    assert_eq!(desired.deployed, ReplicaSettings::fixed(0));
    assert_eq!(desired.configured, Some(ReplicaSettings::scaled(Some(2), 4)));
    assert_eq!(
        desired.restart_requested_at(),
        Some(timestamp("2024-05-02T10:00:00Z"))
    );

    let unconfigured = DesiredComponentConfig::from_kube(&component, None);
    assert_eq!(unconfigured.configured, None);
}

#[test]
pub fn test_desired_job_from_kube() {
    let job = DeployJobComponent {
        name: "compute".to_string(),
        image: "compute:1".to_string(),
        ..DeployJobComponent::default()
    };
    let desired = DesiredComponentConfig::from_kube_job(&job);
    assert_eq!(desired.kind, ComponentKind::Job);
    assert_eq!(desired.image, "compute:1");
    assert_eq!(desired.configured, None);
}

#[test]
pub fn test_reconciliation_marker() {
    let mut deployment = deployment("web-1", "Active", None);
    assert_eq!(ReconciliationMarker::from_kube(&deployment).reconciled_at, None);
    if let Some(status) = deployment.status.as_mut() {
        status.reconciled = Some(time("2024-05-02T10:00:00Z"));
    }
    assert_eq!(
        ReconciliationMarker::from_kube(&deployment).reconciled_at,
        Some(timestamp("2024-05-02T10:00:00Z"))
    );
}

#[test]
pub fn test_active_deployment_selection() {
    let deployments = vec![
        deployment("gen-1", "Inactive", Some("2024-05-01T00:00:00Z")),
        deployment("gen-2", "Active", Some("2024-05-02T00:00:00Z")),
        deployment("gen-3", "Active", Some("2024-05-03T00:00:00Z")),
        deployment("gen-4", "Inactive", Some("2024-05-04T00:00:00Z")),
    ];
    assert!(!is_active(&deployments[0]));
    let active = active_deployment(deployments).unwrap();
    assert_eq!(active.metadata.name.as_deref(), Some("gen-3"));
    assert!(active_deployment(vec![deployment("gen-1", "Inactive", None)]).is_none());
    assert!(active_deployment(Vec::new()).is_none());
}

#[test]
pub fn test_environment_config_lookup() {
    let application = WorkloadApplication::new(
        "shop",
        WorkloadApplicationSpec {
            components: vec![ApplicationComponent {
                name: "web".to_string(),
                environment_config: vec![ComponentEnvironmentConfig {
                    environment: "prod".to_string(),
                    replicas: Some(3),
                    horizontal_scaling: None,
                }],
            }],
        },
    );
    assert_eq!(
        environment_config(&application, "web", "prod").and_then(|config| config.replicas),
        Some(3)
    );
    assert!(environment_config(&application, "web", "dev").is_none());
    assert!(environment_config(&application, "api", "prod").is_none());
}
