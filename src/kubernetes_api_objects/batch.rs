// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::{BatchJobPodStatus, BatchJobStatus, WorkloadBatch};
use crate::resolver::batch::{
    BatchCondition, BatchJobRecord, BatchRecord, JobPhase, PodObservation, PodPhase,
};

impl BatchRecord {
    /// Joins the stop flags in `spec.jobs` with the job statuses in `status.jobStatuses`.
    ///
    /// Jobs only present in `status.jobStatuses` are kept, without a stop flag.
    pub fn from_kube(batch: &WorkloadBatch) -> BatchRecord {
        let job_statuses: &[BatchJobStatus] = batch
            .status
            .as_ref()
            .map(|status| status.job_statuses.as_slice())
            .unwrap_or_default();

        let mut jobs: Vec<BatchJobRecord> = batch
            .spec
            .jobs
            .iter()
            .map(|job| {
                let status = job_statuses.iter().find(|status| status.name == job.name);
                BatchJobRecord::from_kube(&job.name, job.stop, status)
            })
            .collect();
        jobs.extend(
            job_statuses
                .iter()
                .filter(|status| !batch.spec.jobs.iter().any(|job| job.name == status.name))
                .map(|status| BatchJobRecord::from_kube(&status.name, None, Some(status))),
        );

        let condition = batch
            .status
            .as_ref()
            .and_then(|status| status.condition.as_ref())
            .and_then(|condition| condition.type_.as_deref())
            .and_then(BatchCondition::parse);

        BatchRecord {
            name: batch.metadata.name.clone().unwrap_or_default(),
            condition,
            jobs,
        }
    }
}

impl BatchJobRecord {
    pub fn from_kube(
        name: &str,
        stop: Option<bool>,
        status: Option<&BatchJobStatus>,
    ) -> BatchJobRecord {
        match status {
            None => BatchJobRecord {
                stop,
                ..BatchJobRecord::new(name)
            },
            Some(status) => BatchJobRecord {
                name: name.to_string(),
                stop,
                phase: status.phase.as_deref().and_then(JobPhase::parse),
                pods: status.pod_statuses.iter().map(PodObservation::from_kube).collect(),
                message: status.message.clone(),
                started_at: status.start_time.as_ref().map(|time| time.0),
                ended_at: status.end_time.as_ref().map(|time| time.0),
            },
        }
    }
}

impl PodObservation {
    pub fn from_kube(status: &BatchJobPodStatus) -> PodObservation {
        PodObservation {
            name: status.name.clone(),
            phase: status.phase.as_deref().and_then(PodPhase::parse),
            exit_code: status.exit_code,
            reason: status.reason.clone(),
            message: status.message.clone(),
            restart_count: status.restart_count,
            started_at: status.start_time.as_ref().map(|time| time.0),
            ended_at: status.end_time.as_ref().map(|time| time.0),
        }
    }
}
