// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to get kube client: {0}")]
    ClientGetFailed(#[from] kube::Error),

    #[error("Failed to list {kind} in namespace {namespace}: {source}")]
    ListFailed {
        kind: &'static str,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
