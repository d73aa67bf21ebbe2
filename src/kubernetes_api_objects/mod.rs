// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
//! Conversions from orchestrator objects into resolver inputs.
//!
//! Every conversion is lenient: missing fields become `None` or empty, unknown phase strings become
//! `None`. Reads never fail on partially populated objects.
pub mod batch;
pub mod deployment;
pub mod pod;
pub mod secret;
