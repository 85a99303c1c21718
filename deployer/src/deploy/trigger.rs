//! Job submission seam

use async_trait::async_trait;
use nomad_jobspec::Job;

use crate::config::ClientConfig;

/// Result of submitting a job and waiting for its rollout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub success: bool,

    /// Why the rollout failed, when the trigger knows
    pub cause: Option<String>,
}

impl TriggerOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            cause: None,
        }
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Self {
            success: false,
            cause: Some(cause.into()),
        }
    }
}

/// Boolean-only triggers carry no cause
impl From<bool> for TriggerOutcome {
    fn from(success: bool) -> Self {
        Self {
            success,
            cause: None,
        }
    }
}

/// Submits a tagged job and blocks until the scheduler reports the rollout
/// as complete or failed
#[async_trait]
pub trait DeploymentTrigger: Send + Sync {
    async fn trigger(&self, job: &Job, client: &ClientConfig) -> TriggerOutcome;
}
