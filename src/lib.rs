// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod common;
pub mod config;
pub mod crds;
pub mod error;
pub mod external_api;
pub mod kubernetes_api_objects;
pub mod models;
pub mod resolver;
pub mod shim_layer;
