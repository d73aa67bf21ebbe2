// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use anyhow::Result;
use kube::CustomResourceExt;
use std::env;
use tracing::{error, info};
use workload_status::config::FetchConfig;
use workload_status::crds::{WorkloadApplication, WorkloadBatch, WorkloadDeployment};
use workload_status::external_api::X509Validator;
use workload_status::models::EnvironmentStatus;
use workload_status::shim_layer::Fetcher;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args: Vec<String> = env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or_default();

    match cmd {
        "export" => {
            info!("exporting custom resource definitions");
            println!("{}", serde_yaml::to_string(&WorkloadDeployment::crd())?);
            println!("---");
            println!("{}", serde_yaml::to_string(&WorkloadApplication::crd())?);
            println!("---");
            println!("{}", serde_yaml::to_string(&WorkloadBatch::crd())?);
        }
        "status" if args.len() >= 4 => {
            let application = &args[2];
            let environments = &args[3..];
            let config = FetchConfig::from_env()?;
            let snapshots = Fetcher::try_default(config)
                .await?
                .environments(application, environments)
                .await?;
            let validator = X509Validator::new();
            let statuses: Vec<EnvironmentStatus> = snapshots
                .iter()
                .map(|snapshot| EnvironmentStatus::assemble(snapshot, &validator))
                .collect();
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        "status" => {
            error!("missing arguments; please use \"status <application> <environment>...\"");
        }
        _ => {
            error!("wrong command; please use \"export\" or \"status\"");
        }
    }
    Ok(())
}
