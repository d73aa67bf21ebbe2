// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;

/// Label that ties a pod to the component it runs.
pub const COMPONENT_LABEL: &str = "workload.dev/component";

#[derive(
    kube::CustomResource,
    Default,
    Debug,
    Clone,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
    PartialEq,
)]
#[kube(group = "workload.dev", version = "v1", kind = "WorkloadDeployment")]
#[kube(shortname = "wd", namespaced)]
#[kube(status = "WorkloadDeploymentStatus")]
pub struct WorkloadDeploymentSpec {
    pub application: String,
    pub environment: String,
    #[serde(default)]
    pub components: Vec<DeployComponent>,
    #[serde(default)]
    pub jobs: Vec<DeployJobComponent>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct DeployComponent {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "horizontalScaling", skip_serializing_if = "Option::is_none")]
    pub horizontal_scaling: Option<HorizontalScalingSpec>,
    #[serde(rename = "environmentVariables", default)]
    pub environment_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(rename = "externalSecrets", default)]
    pub external_secrets: Vec<String>,
    #[serde(rename = "externalDns", default)]
    pub external_dns: Vec<String>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct DeployJobComponent {
    pub name: String,
    pub image: String,
    #[serde(rename = "environmentVariables", default)]
    pub environment_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(rename = "externalSecrets", default)]
    pub external_secrets: Vec<String>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct HorizontalScalingSpec {
    #[serde(rename = "minReplicas", skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,
    #[serde(rename = "maxReplicas")]
    pub max_replicas: i32,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct WorkloadDeploymentStatus {
    /// "Active" for the deployment currently serving the environment, "Inactive" otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<Time>,
    #[serde(rename = "activeFrom", skip_serializing_if = "Option::is_none")]
    pub active_from: Option<Time>,
}

#[derive(
    kube::CustomResource,
    Default,
    Debug,
    Clone,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
    PartialEq,
)]
#[kube(group = "workload.dev", version = "v1", kind = "WorkloadApplication")]
#[kube(shortname = "wa", namespaced)]
pub struct WorkloadApplicationSpec {
    #[serde(default)]
    pub components: Vec<ApplicationComponent>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct ApplicationComponent {
    pub name: String,
    #[serde(rename = "environmentConfig", default)]
    pub environment_config: Vec<ComponentEnvironmentConfig>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct ComponentEnvironmentConfig {
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "horizontalScaling", skip_serializing_if = "Option::is_none")]
    pub horizontal_scaling: Option<HorizontalScalingSpec>,
}

#[derive(
    kube::CustomResource,
    Default,
    Debug,
    Clone,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
    PartialEq,
)]
#[kube(group = "workload.dev", version = "v1", kind = "WorkloadBatch")]
#[kube(shortname = "wb", namespaced)]
#[kube(status = "WorkloadBatchStatus")]
pub struct WorkloadBatchSpec {
    #[serde(rename = "jobComponent")]
    pub job_component: String,
    #[serde(default)]
    pub jobs: Vec<BatchJobSpec>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct BatchJobSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<bool>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct WorkloadBatchStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BatchConditionStatus>,
    #[serde(rename = "jobStatuses", default)]
    pub job_statuses: Vec<BatchJobStatus>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct BatchConditionStatus {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "activeTime", skip_serializing_if = "Option::is_none")]
    pub active_time: Option<Time>,
    #[serde(rename = "completionTime", skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<Time>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct BatchJobStatus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Time>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Time>,
    #[serde(rename = "podStatuses", default)]
    pub pod_statuses: Vec<BatchJobPodStatus>,
}

#[derive(
    Default, Debug, Clone, serde::Deserialize, serde::Serialize, schemars::JsonSchema, PartialEq,
)]
pub struct BatchJobPodStatus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(rename = "exitCode", skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "restartCount", default)]
    pub restart_count: i32,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Time>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Time>,
}
