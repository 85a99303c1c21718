//! Nomad deployment trigger

use std::time::Duration;

use async_trait::async_trait;
use nomad_jobspec::api::{Deployment, Evaluation};
use nomad_jobspec::Job;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::deploy::trigger::{DeploymentTrigger, TriggerOutcome};
use crate::errors::DeployError;
use crate::http::client::{build_client, HttpClient};

/// Polling settings for a rollout
#[derive(Debug, Clone)]
pub struct TriggerOptions {
    /// Delay between status polls
    pub poll_interval: Duration,

    /// Give up on the rollout after this long
    pub timeout: Duration,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600), // 10 minutes
        }
    }
}

/// Registers jobs with Nomad and watches them until rolled out
#[derive(Debug, Clone)]
pub struct NomadTrigger {
    client: reqwest::Client,
    options: TriggerOptions,
}

impl NomadTrigger {
    pub fn new(options: TriggerOptions) -> Result<Self, DeployError> {
        Ok(Self {
            client: build_client()?,
            options,
        })
    }

    async fn rollout(&self, job: &Job, config: &ClientConfig) -> Result<(), DeployError> {
        let http = HttpClient::with_client(self.client.clone(), &config.address)?
            .with_token(config.token.clone());
        let job_id = job.id.as_deref().or(job.name.as_deref()).unwrap_or("<unnamed>");

        info!("Registering job {} with {}", job_id, http.base_url());
        let registered = http.register_job(job).await?;
        debug!(
            "Job {} registered at modify index {}",
            job_id, registered.job_modify_index
        );
        if !registered.warnings.is_empty() {
            warn!("Nomad returned warnings for job {}: {}", job_id, registered.warnings);
        }

        if registered.eval_id.is_empty() {
            // periodic and parameterized jobs are registered without an evaluation
            info!("Job {} registered without an evaluation", job_id);
            return Ok(());
        }

        let evaluation = self.wait_for_evaluation(&http, &registered.eval_id).await?;

        if !job.is_service() {
            info!("Evaluation {} complete for job {}", evaluation.id, job_id);
            return Ok(());
        }
        if evaluation.deployment_id.is_empty() {
            info!("No deployment created for job {}, nothing to watch", job_id);
            return Ok(());
        }

        self.wait_for_deployment(&http, &evaluation.deployment_id).await
    }

    async fn wait_for_evaluation(
        &self,
        http: &HttpClient,
        eval_id: &str,
    ) -> Result<Evaluation, DeployError> {
        loop {
            let evaluation = http.evaluation(eval_id).await?;
            match evaluation.status.as_str() {
                Evaluation::STATUS_COMPLETE => {
                    if let Some(failed) = evaluation
                        .failed_tg_allocs
                        .as_ref()
                        .filter(|groups| !groups.is_empty())
                    {
                        let groups: Vec<&str> = failed.keys().map(String::as_str).collect();
                        return Err(DeployError::Rollout(format!(
                            "evaluation {} failed to place allocations for task groups: {}",
                            eval_id,
                            groups.join(", ")
                        )));
                    }
                    return Ok(evaluation);
                }
                Evaluation::STATUS_FAILED | Evaluation::STATUS_CANCELED => {
                    return Err(DeployError::Rollout(format!(
                        "evaluation {} {}: {}",
                        eval_id, evaluation.status, evaluation.status_description
                    )));
                }
                status => debug!("Evaluation {} is {}", eval_id, status),
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    async fn wait_for_deployment(
        &self,
        http: &HttpClient,
        deployment_id: &str,
    ) -> Result<(), DeployError> {
        info!("Watching deployment {}", deployment_id);
        loop {
            let deployment = http.deployment(deployment_id).await?;
            match deployment.status.as_str() {
                Deployment::STATUS_SUCCESSFUL => {
                    info!("Deployment {} successful", deployment_id);
                    return Ok(());
                }
                Deployment::STATUS_FAILED | Deployment::STATUS_CANCELLED => {
                    return Err(DeployError::Rollout(format!(
                        "deployment {} {}: {}",
                        deployment_id, deployment.status, deployment.status_description
                    )));
                }
                status => debug!("Deployment {} is {}", deployment_id, status),
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

#[async_trait]
impl DeploymentTrigger for NomadTrigger {
    async fn trigger(&self, job: &Job, client: &ClientConfig) -> TriggerOutcome {
        match tokio::time::timeout(self.options.timeout, self.rollout(job, client)).await {
            Ok(Ok(())) => TriggerOutcome::succeeded(),
            Ok(Err(e)) => TriggerOutcome::failed(e.to_string()),
            Err(_) => TriggerOutcome::failed(format!(
                "rollout did not finish within {:?}",
                self.options.timeout
            )),
        }
    }
}
