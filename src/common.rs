// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub fn environment_namespace(application: &str, environment: &str) -> String {
    format!("{}-{}", application, environment)
}

pub fn application_namespace(application: &str) -> String {
    format!("{}-app", application)
}

pub fn component_secret_name(component: &str) -> String {
    format!("{}-secrets", component)
}

pub fn external_secret_name(component: &str) -> String {
    format!("{}-external-secrets", component)
}

/// Certificate and key for an external hostname live in a secret named after the hostname.
pub fn tls_secret_name(hostname: &str) -> String {
    hostname.to_string()
}
