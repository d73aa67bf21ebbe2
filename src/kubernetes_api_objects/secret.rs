// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::resolver::credential::StoredCredentialObject;
use k8s_openapi::api::core::v1 as corev1;

impl StoredCredentialObject {
    /// Collects `data` and `stringData`; `stringData` wins on a key collision, as on the API server.
    pub fn from_kube(secret: &corev1::Secret) -> StoredCredentialObject {
        let mut stored = StoredCredentialObject::new(secret.metadata.name.clone().unwrap_or_default());
        for (key, value) in secret.data.iter().flatten() {
            stored.insert(key.clone(), value.0.clone());
        }
        for (key, value) in secret.string_data.iter().flatten() {
            stored.insert(key.clone(), value.clone().into_bytes());
        }
        stored
    }
}
