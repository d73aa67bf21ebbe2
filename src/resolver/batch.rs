// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::resolver::rules::{resolve_with, Rule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ProgressStatus is the user-facing status of a batch or of a job inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    Waiting,
    Active,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Stopping,
    /// Kept for API compatibility. No resolver produces it.
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Waiting => "Waiting",
            ProgressStatus::Active => "Active",
            ProgressStatus::Running => "Running",
            ProgressStatus::Succeeded => "Succeeded",
            ProgressStatus::Failed => "Failed",
            ProgressStatus::Stopped => "Stopped",
            ProgressStatus::Stopping => "Stopping",
            ProgressStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last phase the orchestrator reported for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Waiting,
    Active,
    Running,
    Succeeded,
    Failed,
    Stopped,
}

impl JobPhase {
    /// Unknown and empty phases yield `None`.
    pub fn parse(raw: &str) -> Option<JobPhase> {
        match raw {
            "Waiting" => Some(JobPhase::Waiting),
            "Active" => Some(JobPhase::Active),
            "Running" => Some(JobPhase::Running),
            "Succeeded" => Some(JobPhase::Succeeded),
            "Failed" => Some(JobPhase::Failed),
            "Stopped" => Some(JobPhase::Stopped),
            _ => None,
        }
    }
}

fn phase_status(phase: Option<JobPhase>) -> ProgressStatus {
    match phase {
        Some(JobPhase::Active) => ProgressStatus::Active,
        Some(JobPhase::Running) => ProgressStatus::Running,
        Some(JobPhase::Succeeded) => ProgressStatus::Succeeded,
        Some(JobPhase::Failed) => ProgressStatus::Failed,
        Some(JobPhase::Stopped) => ProgressStatus::Stopped,
        Some(JobPhase::Waiting) | None => ProgressStatus::Waiting,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Stopped,
}

impl PodPhase {
    pub fn parse(raw: &str) -> Option<PodPhase> {
        match raw {
            "Pending" => Some(PodPhase::Pending),
            "Running" => Some(PodPhase::Running),
            "Succeeded" => Some(PodPhase::Succeeded),
            "Failed" => Some(PodPhase::Failed),
            "Stopped" => Some(PodPhase::Stopped),
            _ => None,
        }
    }
}

/// One execution attempt of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodObservation {
    pub name: String,
    pub phase: Option<PodPhase>,
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub restart_count: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PodObservation {
    pub fn failed(&self) -> bool {
        self.phase == Some(PodPhase::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchJobRecord {
    pub name: String,
    pub stop: Option<bool>,
    pub phase: Option<JobPhase>,
    pub pods: Vec<PodObservation>,
    pub message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl BatchJobRecord {
    pub fn new(name: impl Into<String>) -> BatchJobRecord {
        BatchJobRecord {
            name: name.into(),
            ..BatchJobRecord::default()
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop == Some(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchCondition {
    Waiting,
    Active,
    Completed,
}

impl BatchCondition {
    pub fn parse(raw: &str) -> Option<BatchCondition> {
        match raw {
            "Waiting" => Some(BatchCondition::Waiting),
            "Active" => Some(BatchCondition::Active),
            "Completed" => Some(BatchCondition::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRecord {
    pub name: String,
    pub condition: Option<BatchCondition>,
    pub jobs: Vec<BatchJobRecord>,
}

/// Every execution attempt failed, even if the phase has not caught up yet.
pub fn all_attempts_failed(job: &BatchJobRecord) -> Option<ProgressStatus> {
    (!job.pods.is_empty() && job.pods.iter().all(PodObservation::failed))
        .then_some(ProgressStatus::Failed)
}

/// A stop was requested and the job has not reached a terminal phase.
pub fn stop_requested(job: &BatchJobRecord) -> Option<ProgressStatus> {
    let in_progress = matches!(
        phase_status(job.phase),
        ProgressStatus::Waiting | ProgressStatus::Active | ProgressStatus::Running
    );
    (job.stop_requested() && in_progress).then_some(ProgressStatus::Stopping)
}

pub fn observed_phase(job: &BatchJobRecord) -> Option<ProgressStatus> {
    Some(phase_status(job.phase))
}

pub const JOB_RULES: &[Rule<BatchJobRecord, ProgressStatus>] = &[
    Rule {
        name: "all-attempts-failed",
        apply: all_attempts_failed,
    },
    Rule {
        name: "stop-requested",
        apply: stop_requested,
    },
    Rule {
        name: "observed-phase",
        apply: observed_phase,
    },
];

pub fn active_batch(batch: &BatchRecord) -> Option<ProgressStatus> {
    if batch.condition != Some(BatchCondition::Active) {
        return None;
    }
    if batch
        .jobs
        .iter()
        .any(|job| job.phase == Some(JobPhase::Running))
    {
        Some(ProgressStatus::Running)
    } else {
        Some(ProgressStatus::Active)
    }
}

/// A completed batch only counts as failed when every one of its jobs failed.
pub fn completed_batch(batch: &BatchRecord) -> Option<ProgressStatus> {
    if batch.condition != Some(BatchCondition::Completed) {
        return None;
    }
    if !batch.jobs.is_empty()
        && batch
            .jobs
            .iter()
            .all(|job| job.phase == Some(JobPhase::Failed))
    {
        Some(ProgressStatus::Failed)
    } else {
        Some(ProgressStatus::Succeeded)
    }
}

pub const BATCH_RULES: &[Rule<BatchRecord, ProgressStatus>] = &[
    Rule {
        name: "active-batch",
        apply: active_batch,
    },
    Rule {
        name: "completed-batch",
        apply: completed_batch,
    },
];

pub fn resolve_job(job: &BatchJobRecord) -> ProgressStatus {
    resolve_with(JOB_RULES, job, ProgressStatus::Waiting)
}

/// Aggregate status of a batch. Reads the batch condition and job phases only, never pod detail.
pub fn resolve_batch(batch: &BatchRecord) -> ProgressStatus {
    resolve_with(BATCH_RULES, batch, ProgressStatus::Waiting)
}
