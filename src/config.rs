// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::error::Error;
use std::env;

pub const PARALLELISM_ENV_VAR: &str = "WORKLOAD_STATUS_PARALLELISM";
pub const DEFAULT_PARALLELISM: usize = 5;
pub const MAX_PARALLELISM: usize = 32;

/// Settings for the data-fetch fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Upper bound on environments fetched concurrently.
    pub parallelism: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Result<FetchConfig, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<FetchConfig, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parallelism = match lookup(PARALLELISM_ENV_VAR) {
            None => DEFAULT_PARALLELISM,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::InvalidConfig(format!(
                    "{} must be a positive integer, got {:?}",
                    PARALLELISM_ENV_VAR, raw
                ))
            })?,
        };
        if parallelism == 0 || parallelism > MAX_PARALLELISM {
            return Err(Error::InvalidConfig(format!(
                "{} must be within 1..={}, got {}",
                PARALLELISM_ENV_VAR, MAX_PARALLELISM, parallelism
            )));
        }
        Ok(FetchConfig { parallelism })
    }
}
