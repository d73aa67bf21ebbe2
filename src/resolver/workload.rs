// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::resolver::rules::{resolve_with, Rule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::warn;

/// Replica count used when neither a fixed count nor a scaling floor is declared.
pub const DEFAULT_REPLICAS: i32 = 1;

/// Environment variable carrying a restart request (RFC 3339), visible on running instances and on
/// the running generation.
pub const RESTART_ENV_VAR: &str = "WORKLOAD_RESTART";

/// ComponentStatus is the user-facing status of one workload component in one environment.
///
/// The string forms are part of the REST wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentStatus {
    Stopped,
    Consistent,
    Reconciling,
    Restarting,
    Outdated,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Stopped => "Stopped",
            ComponentStatus::Consistent => "Consistent",
            ComponentStatus::Reconciling => "Reconciling",
            ComponentStatus::Restarting => "Restarting",
            ComponentStatus::Outdated => "Outdated",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    /// Long-running service.
    Service,
    /// Job scheduler for run-to-completion work.
    Job,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HorizontalScaling {
    pub min_replicas: Option<i32>,
    pub max_replicas: i32,
}

/// Replica intent. `replicas: None` means "use the platform default", which is not the same
/// as `Some(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaSettings {
    pub replicas: Option<i32>,
    pub horizontal_scaling: Option<HorizontalScaling>,
}

impl ReplicaSettings {
    pub fn fixed(replicas: i32) -> ReplicaSettings {
        ReplicaSettings {
            replicas: Some(replicas),
            horizontal_scaling: None,
        }
    }

    pub fn scaled(min_replicas: Option<i32>, max_replicas: i32) -> ReplicaSettings {
        ReplicaSettings {
            replicas: None,
            horizontal_scaling: Some(HorizontalScaling {
                min_replicas,
                max_replicas,
            }),
        }
    }

    /// Inclusive range of instance counts this setting accepts.
    pub fn expected_range(&self) -> RangeInclusive<usize> {
        match &self.horizontal_scaling {
            None => {
                let replicas = count(self.replicas.unwrap_or(DEFAULT_REPLICAS));
                replicas..=replicas
            }
            // An explicit zero stops the component even when scaling bounds are declared.
            Some(_) if self.replicas == Some(0) => 0..=0,
            Some(scaling) => {
                count(scaling.min_replicas.unwrap_or(DEFAULT_REPLICAS))..=count(scaling.max_replicas)
            }
        }
    }

    pub fn accepts(&self, observed: usize) -> bool {
        self.expected_range().contains(&observed)
    }
}

fn count(replicas: i32) -> usize {
    replicas.max(0) as usize
}

/// DesiredComponentConfig is the declared configuration of one component in one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredComponentConfig {
    pub name: String,
    pub kind: ComponentKind,
    pub image: String,
    /// Replica setting of the currently running generation.
    pub deployed: ReplicaSettings,
    /// Replica setting of the latest environment configuration, if the environment has one.
    pub configured: Option<ReplicaSettings>,
    pub environment_variables: BTreeMap<String, String>,
}

impl DesiredComponentConfig {
    pub fn new(
        name: impl Into<String>,
        kind: ComponentKind,
        image: impl Into<String>,
    ) -> DesiredComponentConfig {
        DesiredComponentConfig {
            name: name.into(),
            kind,
            image: image.into(),
            deployed: ReplicaSettings::default(),
            configured: None,
            environment_variables: BTreeMap::new(),
        }
    }

    fn configured_accepts(&self, observed: usize) -> bool {
        match &self.configured {
            Some(configured) => configured.accepts(observed),
            None => observed == count(DEFAULT_REPLICAS),
        }
    }

    /// Restart request written onto the running generation, if one is set and parses.
    pub fn restart_requested_at(&self) -> Option<DateTime<Utc>> {
        restart_stamp(&self.environment_variables, &self.name)
    }
}

/// Reads the restart request from a set of environment variables. Empty and malformed values count
/// as absent; malformed ones are logged.
fn restart_stamp(variables: &BTreeMap<String, String>, owner: &str) -> Option<DateTime<Utc>> {
    let raw = variables.get(RESTART_ENV_VAR)?.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => Some(timestamp.with_timezone(&Utc)),
        Err(err) => {
            warn!(
                "ignoring malformed {} {:?} on {}: {}",
                RESTART_ENV_VAR, raw, owner, err
            );
            None
        }
    }
}

/// RunningInstance is one observed unit of execution (a pod).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningInstance {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    /// One image per container.
    pub images: Vec<String>,
    pub terminating: bool,
    pub environment_variables: BTreeMap<String, String>,
}

impl RunningInstance {
    /// Restart request visible in this instance's runtime environment.
    pub fn restart_requested_at(&self) -> Option<DateTime<Utc>> {
        restart_stamp(&self.environment_variables, &self.name)
    }
}

/// Last time the desired-state object was reconciled; `None` if it never was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationMarker {
    pub reconciled_at: Option<DateTime<Utc>>,
}

pub struct WorkloadObservation<'a> {
    pub desired: &'a DesiredComponentConfig,
    pub running: &'a [RunningInstance],
    pub reconciled: &'a ReconciliationMarker,
}

/// A service scaled to zero by configuration while the running generation agrees on zero.
pub fn scaled_to_zero(obs: &WorkloadObservation<'_>) -> Option<ComponentStatus> {
    let observed = obs.running.len();
    (observed == 0
        && !obs.desired.configured_accepts(observed)
        && obs.desired.deployed.accepts(observed))
    .then_some(ComponentStatus::Stopped)
}

/// Instance count outside what the running generation asks for.
pub fn replica_mismatch(obs: &WorkloadObservation<'_>) -> Option<ComponentStatus> {
    (!obs.desired.deployed.accepts(obs.running.len())).then_some(ComponentStatus::Reconciling)
}

pub fn job_scheduler_stopped(obs: &WorkloadObservation<'_>) -> Option<ComponentStatus> {
    obs.running.is_empty().then_some(ComponentStatus::Stopped)
}

/// Any live instance running a container image other than the desired one.
pub fn outdated_image(obs: &WorkloadObservation<'_>) -> Option<ComponentStatus> {
    obs.running
        .iter()
        .filter(|instance| !instance.terminating)
        .flat_map(|instance| instance.images.iter())
        .any(|image| image != &obs.desired.image)
        .then_some(ComponentStatus::Outdated)
}

/// Latest restart request among the live instances and the running generation.
pub fn requested_restart(obs: &WorkloadObservation<'_>) -> Option<DateTime<Utc>> {
    obs.running
        .iter()
        .filter(|instance| !instance.terminating)
        .filter_map(RunningInstance::restart_requested_at)
        .chain(obs.desired.restart_requested_at())
        .max()
}

/// A restart request newer than the last reconciliation.
pub fn pending_restart(obs: &WorkloadObservation<'_>) -> Option<ComponentStatus> {
    let requested_at = requested_restart(obs)?;
    match obs.reconciled.reconciled_at {
        Some(reconciled_at) if requested_at <= reconciled_at => None,
        _ => Some(ComponentStatus::Restarting),
    }
}

pub fn service_rules<'a>() -> [Rule<WorkloadObservation<'a>, ComponentStatus>; 4] {
    [
        Rule {
            name: "scaled-to-zero",
            apply: scaled_to_zero,
        },
        Rule {
            name: "replica-mismatch",
            apply: replica_mismatch,
        },
        Rule {
            name: "outdated-image",
            apply: outdated_image,
        },
        Rule {
            name: "pending-restart",
            apply: pending_restart,
        },
    ]
}

pub fn job_rules<'a>() -> [Rule<WorkloadObservation<'a>, ComponentStatus>; 2] {
    [
        Rule {
            name: "job-scheduler-stopped",
            apply: job_scheduler_stopped,
        },
        Rule {
            name: "pending-restart",
            apply: pending_restart,
        },
    ]
}

/// Resolves the status of one component from its desired configuration and running instances.
pub fn resolve_component(
    desired: &DesiredComponentConfig,
    running: &[RunningInstance],
    reconciled: &ReconciliationMarker,
) -> ComponentStatus {
    let observation = WorkloadObservation {
        desired,
        running,
        reconciled,
    };
    match desired.kind {
        ComponentKind::Service => {
            resolve_with(&service_rules(), &observation, ComponentStatus::Consistent)
        }
        ComponentKind::Job => resolve_with(&job_rules(), &observation, ComponentStatus::Consistent),
    }
}
