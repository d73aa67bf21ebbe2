// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::{
    ComponentEnvironmentConfig, DeployComponent, DeployJobComponent, HorizontalScalingSpec,
    WorkloadApplication, WorkloadDeployment,
};
use crate::resolver::workload::{
    ComponentKind, DesiredComponentConfig, HorizontalScaling, ReconciliationMarker,
    ReplicaSettings,
};

pub const ACTIVE_CONDITION: &str = "Active";

impl ReplicaSettings {
    pub fn from_kube(
        replicas: Option<i32>,
        horizontal_scaling: Option<&HorizontalScalingSpec>,
    ) -> ReplicaSettings {
        ReplicaSettings {
            replicas,
            horizontal_scaling: horizontal_scaling.map(|scaling| HorizontalScaling {
                min_replicas: scaling.min_replicas,
                max_replicas: scaling.max_replicas,
            }),
        }
    }
}

impl DesiredComponentConfig {
    /// Builds the desired state of a service from the running generation (`component`) and the
    /// latest environment configuration, if the application declares one for this environment.
    pub fn from_kube(
        component: &DeployComponent,
        environment_config: Option<&ComponentEnvironmentConfig>,
    ) -> DesiredComponentConfig {
        DesiredComponentConfig {
            name: component.name.clone(),
            kind: ComponentKind::Service,
            image: component.image.clone(),
            deployed: ReplicaSettings::from_kube(
                component.replicas,
                component.horizontal_scaling.as_ref(),
            ),
            configured: environment_config.map(|config| {
                ReplicaSettings::from_kube(config.replicas, config.horizontal_scaling.as_ref())
            }),
            environment_variables: component.environment_variables.clone(),
        }
    }

    pub fn from_kube_job(job: &DeployJobComponent) -> DesiredComponentConfig {
        DesiredComponentConfig {
            environment_variables: job.environment_variables.clone(),
            ..DesiredComponentConfig::new(&job.name, ComponentKind::Job, &job.image)
        }
    }
}

impl ReconciliationMarker {
    pub fn from_kube(deployment: &WorkloadDeployment) -> ReconciliationMarker {
        ReconciliationMarker {
            reconciled_at: deployment
                .status
                .as_ref()
                .and_then(|status| status.reconciled.as_ref())
                .map(|time| time.0),
        }
    }
}

pub fn is_active(deployment: &WorkloadDeployment) -> bool {
    deployment
        .status
        .as_ref()
        .and_then(|status| status.condition.as_deref())
        == Some(ACTIVE_CONDITION)
}

/// The environment configuration an application declares for one component, if any.
pub fn environment_config<'a>(
    application: &'a WorkloadApplication,
    component: &str,
    environment: &str,
) -> Option<&'a ComponentEnvironmentConfig> {
    application
        .spec
        .components
        .iter()
        .find(|candidate| candidate.name == component)?
        .environment_config
        .iter()
        .find(|config| config.environment == environment)
}

/// The deployment currently serving an environment: the active one that became active last.
pub fn active_deployment(deployments: Vec<WorkloadDeployment>) -> Option<WorkloadDeployment> {
    deployments
        .into_iter()
        .filter(is_active)
        .max_by_key(|deployment| {
            deployment
                .status
                .as_ref()
                .and_then(|status| status.active_from.as_ref())
                .map(|time| time.0)
        })
}
