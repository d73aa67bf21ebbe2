// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::common::{component_secret_name, external_secret_name, tls_secret_name};
use crate::external_api::TransportValidator;
use crate::kubernetes_api_objects::deployment::environment_config;
use crate::kubernetes_api_objects::pod::component_name;
use crate::resolver::batch::{
    resolve_batch, resolve_job, BatchJobRecord, BatchRecord, PodObservation, PodPhase,
    ProgressStatus,
};
use crate::resolver::credential::{
    resolve_external, resolve_generic, resolve_transport, CredentialDeclaration, CredentialStatus,
    StoredCredentialObject, TransportResolution,
};
use crate::resolver::workload::{
    resolve_component, ComponentKind, ComponentStatus, DesiredComponentConfig,
    ReconciliationMarker, RunningInstance,
};
use crate::shim_layer::EnvironmentSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub name: String,
    pub kind: ComponentKind,
    pub image: String,
    pub status: ComponentStatus,
    pub replicas: Vec<ReplicaSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub terminating: bool,
}

impl ReplicaSummary {
    pub fn from_instance(instance: &RunningInstance) -> ReplicaSummary {
        ReplicaSummary {
            name: instance.name.clone(),
            created_at: instance.created_at,
            terminating: instance.terminating,
        }
    }
}

/// One execution attempt of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<PodPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub restart_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl PodSummary {
    pub fn from_observation(pod: &PodObservation) -> PodSummary {
        PodSummary {
            name: pod.name.clone(),
            phase: pod.phase,
            exit_code: pod.exit_code,
            reason: pod.reason.clone(),
            message: pod.message.clone(),
            restart_count: pod.restart_count,
            started_at: pod.started_at,
            ended_at: pod.ended_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub name: String,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub pods: Vec<PodSummary>,
}

impl JobSummary {
    pub fn from_record(job: &BatchJobRecord) -> JobSummary {
        JobSummary {
            name: job.name.clone(),
            status: resolve_job(job),
            message: job.message.clone(),
            started_at: job.started_at,
            ended_at: job.ended_at,
            pods: job.pods.iter().map(PodSummary::from_observation).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub name: String,
    pub status: ProgressStatus,
    pub jobs: Vec<JobSummary>,
}

impl BatchSummary {
    pub fn from_record(batch: &BatchRecord) -> BatchSummary {
        BatchSummary {
            name: batch.name.clone(),
            status: resolve_batch(batch),
            jobs: batch.jobs.iter().map(JobSummary::from_record).collect(),
        }
    }
}

/// Status of one secret slot. Carries no secret content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSummary {
    pub name: String,
    pub component: String,
    pub status: CredentialStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSummary {
    pub component: String,
    pub hostname: String,
    pub status: CredentialStatus,
    #[serde(flatten)]
    pub resolution: TransportResolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    pub application: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_deployment: Option<String>,
    pub components: Vec<ComponentSummary>,
    pub batches: Vec<BatchSummary>,
    pub secrets: Vec<SecretSummary>,
    pub tls: Vec<TlsSummary>,
}

impl EnvironmentStatus {
    pub fn assemble<V>(snapshot: &EnvironmentSnapshot, validator: &V) -> EnvironmentStatus
    where
        V: TransportValidator + ?Sized,
    {
        let mut status = EnvironmentStatus {
            application: snapshot.application.clone(),
            environment: snapshot.environment.clone(),
            active_deployment: None,
            components: Vec::new(),
            batches: snapshot
                .batches
                .iter()
                .map(|batch| BatchSummary::from_record(&BatchRecord::from_kube(batch)))
                .collect(),
            secrets: Vec::new(),
            tls: Vec::new(),
        };

        let deployment = match &snapshot.deployment {
            Some(deployment) => deployment,
            None => return status,
        };
        status.active_deployment = deployment.metadata.name.clone();

        let reconciled = ReconciliationMarker::from_kube(deployment);
        let stored: BTreeMap<&str, StoredCredentialObject> = snapshot
            .secrets
            .iter()
            .filter_map(|secret| {
                let name = secret.metadata.name.as_deref()?;
                Some((name, StoredCredentialObject::from_kube(secret)))
            })
            .collect();
        let mut instances: BTreeMap<&str, Vec<RunningInstance>> = BTreeMap::new();
        for pod in &snapshot.pods {
            if let Some(component) = component_name(pod) {
                instances
                    .entry(component)
                    .or_default()
                    .push(RunningInstance::from_kube(pod));
            }
        }

        let services = deployment.spec.components.iter().map(|component| {
            let config = snapshot.application_config.as_ref().and_then(|application| {
                environment_config(application, &component.name, &snapshot.environment)
            });
            DesiredComponentConfig::from_kube(component, config)
        });
        let jobs = deployment
            .spec
            .jobs
            .iter()
            .map(DesiredComponentConfig::from_kube_job);
        for desired in services.chain(jobs) {
            let running: &[RunningInstance] = instances
                .get(desired.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            status.components.push(ComponentSummary {
                name: desired.name.clone(),
                kind: desired.kind,
                image: desired.image.clone(),
                status: resolve_component(&desired, running, &reconciled),
                replicas: running.iter().map(ReplicaSummary::from_instance).collect(),
            });
        }

        let secret_slots = deployment
            .spec
            .components
            .iter()
            .map(|component| (&component.name, &component.secrets, &component.external_secrets))
            .chain(
                deployment
                    .spec
                    .jobs
                    .iter()
                    .map(|job| (&job.name, &job.secrets, &job.external_secrets)),
            );
        for (component, secrets, external_secrets) in secret_slots {
            let component_secrets = stored.get(component_secret_name(component).as_str());
            status
                .secrets
                .extend(secrets.iter().map(|key| SecretSummary {
                    name: key.clone(),
                    component: component.clone(),
                    status: resolve_generic(key, component_secrets),
                }));
            let mirrored = stored.get(external_secret_name(component).as_str());
            status
                .secrets
                .extend(external_secrets.iter().map(|key| SecretSummary {
                    name: key.clone(),
                    component: component.clone(),
                    status: resolve_external(key, mirrored),
                }));
        }

        for component in &deployment.spec.components {
            for hostname in &component.external_dns {
                let declared = CredentialDeclaration {
                    secret_name: tls_secret_name(hostname),
                    hostname: hostname.clone(),
                };
                let resolution = resolve_transport(
                    &declared,
                    stored.get(declared.secret_name.as_str()),
                    validator,
                );
                status.tls.push(TlsSummary {
                    component: component.name.clone(),
                    hostname: hostname.clone(),
                    status: resolution.status(),
                    resolution,
                });
            }
        }
        status
    }
}
