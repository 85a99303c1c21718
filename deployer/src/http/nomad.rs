//! Nomad job API

use nomad_jobspec::api::{Deployment, Evaluation, JobRegisterRequest, JobRegisterResponse};
use nomad_jobspec::Job;

use crate::errors::DeployError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Register (create or update) a job
    pub async fn register_job(&self, job: &Job) -> Result<JobRegisterResponse, DeployError> {
        let url = self.endpoint(["v1", "jobs"]);
        self.post(url, &JobRegisterRequest { job }).await
    }

    /// Get an evaluation
    pub async fn evaluation(&self, eval_id: &str) -> Result<Evaluation, DeployError> {
        let url = self.endpoint(["v1", "evaluation", eval_id]);
        self.get(url).await
    }

    /// Get a deployment
    pub async fn deployment(&self, deployment_id: &str) -> Result<Deployment, DeployError> {
        let url = self.endpoint(["v1", "deployment", deployment_id]);
        self.get(url).await
    }
}
