//! Nomad HTTP API request and response models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Job;

/// Body of `POST /v1/jobs`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRegisterRequest<'a> {
    pub job: &'a Job,
}

/// Response of `POST /v1/jobs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRegisterResponse {
    #[serde(rename = "EvalID", default)]
    pub eval_id: String,

    #[serde(default)]
    pub job_modify_index: u64,

    #[serde(default)]
    pub warnings: String,
}

/// Response of `GET /v1/evaluation/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Evaluation {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub status_description: String,

    /// Deployment created or continued by this evaluation, empty if none
    #[serde(rename = "DeploymentID", default)]
    pub deployment_id: String,

    #[serde(rename = "FailedTGAllocs", default)]
    pub failed_tg_allocs: Option<BTreeMap<String, Value>>,
}

impl Evaluation {
    pub const STATUS_COMPLETE: &'static str = "complete";
    pub const STATUS_FAILED: &'static str = "failed";
    pub const STATUS_CANCELED: &'static str = "canceled";
}

/// Response of `GET /v1/deployment/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub status_description: String,
}

impl Deployment {
    pub const STATUS_SUCCESSFUL: &'static str = "successful";
    pub const STATUS_FAILED: &'static str = "failed";
    pub const STATUS_CANCELLED: &'static str = "cancelled";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_register_and_deployment() {
        let registered: JobRegisterResponse = serde_json::from_str(
            r#"{"EvalID": "e1", "EvalCreateIndex": 12, "JobModifyIndex": 12, "Warnings": ""}"#,
        )
        .unwrap();
        assert_eq!(registered.eval_id, "e1");
        assert_eq!(registered.job_modify_index, 12);

        let deployment: Deployment = serde_json::from_str(
            r#"{"ID": "d1", "JobID": "web", "Status": "failed", "StatusDescription": "Failed due to progress deadline"}"#,
        )
        .unwrap();
        assert_eq!(deployment.id, "d1");
        assert_eq!(deployment.status, Deployment::STATUS_FAILED);
        assert_eq!(deployment.status_description, "Failed due to progress deadline");
    }
}
