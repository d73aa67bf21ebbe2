// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::COMPONENT_LABEL;
use crate::resolver::workload::RunningInstance;
use k8s_openapi::api::core::v1 as corev1;

impl RunningInstance {
    pub fn from_kube(pod: &corev1::Pod) -> RunningInstance {
        let containers: &[corev1::Container] = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default();
        RunningInstance {
            name: pod.metadata.name.clone().unwrap_or_default(),
            created_at: pod.metadata.creation_timestamp.as_ref().map(|time| time.0),
            images: containers
                .iter()
                .filter_map(|container| container.image.clone())
                .collect(),
            terminating: pod.metadata.deletion_timestamp.is_some(),
            // Only literal values; valueFrom references are resolved by the kubelet, not visible here.
            environment_variables: containers
                .iter()
                .flat_map(|container| container.env.iter().flatten())
                .filter_map(|var| Some((var.name.clone(), var.value.clone()?)))
                .collect(),
        }
    }
}

/// Name of the component a pod belongs to, from its labels.
pub fn component_name(pod: &corev1::Pod) -> Option<&str> {
    pod.metadata
        .labels
        .as_ref()?
        .get(COMPONENT_LABEL)
        .map(String::as_str)
}
