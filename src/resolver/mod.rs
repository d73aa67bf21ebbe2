// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
//! Derived-state resolution.
//!
//! Each resolver folds raw observations of independently reconciled objects into one status value.
//! Resolvers are pure: no I/O, no clock, no shared state, so they can be called from any worker.
pub mod batch;
pub mod credential;
pub mod rules;
pub mod workload;

pub use batch::{resolve_batch, resolve_job, ProgressStatus};
pub use credential::{
    resolve_external, resolve_generic, resolve_transport, CredentialStatus, TransportResolution,
};
pub use workload::{resolve_component, ComponentStatus};
