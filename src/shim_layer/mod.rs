// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod fetch;

pub use fetch::{EnvironmentSnapshot, Fetcher};
