// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::common::{application_namespace, environment_namespace};
use crate::config::FetchConfig;
use crate::crds::{WorkloadApplication, WorkloadBatch, WorkloadDeployment};
use crate::error::Error;
use crate::kubernetes_api_objects::deployment::active_deployment;
use core::fmt::Debug;
use futures::{stream, StreamExt, TryStreamExt};
use k8s_openapi::api::core::v1 as corev1;
use kube::api::{Api, ListParams};
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Raw objects of one environment, listed in a single pass.
#[derive(Debug, Clone)]
pub struct EnvironmentSnapshot {
    pub application: String,
    pub environment: String,
    pub deployment: Option<WorkloadDeployment>,
    pub application_config: Option<WorkloadApplication>,
    pub pods: Vec<corev1::Pod>,
    pub secrets: Vec<corev1::Secret>,
    pub batches: Vec<WorkloadBatch>,
}

// The fetcher is the only part of the read path that talks to the API server.
// Environments are fetched concurrently, at most `parallelism` at a time; the first failing
// list call ends the whole fetch and drops every request still in flight.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(client: Client, config: FetchConfig) -> Fetcher {
        Fetcher { client, config }
    }

    /// Connects with the default kubeconfig or in-cluster configuration.
    pub async fn try_default(config: FetchConfig) -> Result<Fetcher, Error> {
        let client = Client::try_default().await?;
        Ok(Fetcher::new(client, config))
    }

    pub async fn environments(
        &self,
        application: &str,
        environments: &[String],
    ) -> Result<Vec<EnvironmentSnapshot>, Error> {
        info!(
            "fetching {} environment(s) of {} with parallelism {}",
            environments.len(),
            application,
            self.config.parallelism
        );
        let mut snapshots: Vec<EnvironmentSnapshot> = stream::iter(environments)
            .map(|environment| self.environment(application, environment))
            .buffer_unordered(self.config.parallelism)
            .try_collect()
            .await?;
        snapshots.sort_by(|a, b| a.environment.cmp(&b.environment));
        Ok(snapshots)
    }

    pub async fn environment(
        &self,
        application: &str,
        environment: &str,
    ) -> Result<EnvironmentSnapshot, Error> {
        let namespace = environment_namespace(application, environment);
        let (deployments, pods, secrets, batches, application_config) = futures::try_join!(
            list::<WorkloadDeployment>(&self.client, &namespace, "WorkloadDeployment"),
            list::<corev1::Pod>(&self.client, &namespace, "Pod"),
            list::<corev1::Secret>(&self.client, &namespace, "Secret"),
            list::<WorkloadBatch>(&self.client, &namespace, "WorkloadBatch"),
            self.application_config(application),
        )?;
        debug!(
            "{}: {} deployment(s), {} pod(s), {} secret(s), {} batch(es)",
            namespace,
            deployments.len(),
            pods.len(),
            secrets.len(),
            batches.len()
        );
        Ok(EnvironmentSnapshot {
            application: application.to_string(),
            environment: environment.to_string(),
            deployment: active_deployment(deployments),
            application_config,
            pods,
            secrets,
            batches,
        })
    }

    async fn application_config(
        &self,
        application: &str,
    ) -> Result<Option<WorkloadApplication>, Error> {
        let namespace = application_namespace(application);
        let api = Api::<WorkloadApplication>::namespaced(self.client.clone(), &namespace);
        api.get_opt(application)
            .await
            .map_err(|source| Error::ListFailed {
                kind: "WorkloadApplication",
                namespace,
                source,
            })
    }
}

async fn list<K>(client: &Client, namespace: &str, kind: &'static str) -> Result<Vec<K>, Error>
where
    K: Clone + Resource<Scope = NamespaceResourceScope> + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    let api = Api::<K>::namespaced(client.clone(), namespace);
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|source| Error::ListFailed {
            kind,
            namespace: namespace.to_string(),
            source,
        })?;
    Ok(list.items)
}
