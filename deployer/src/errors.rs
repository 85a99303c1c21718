//! Error types for the deployer

use thiserror::Error;

/// Main error type for a deploy attempt
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rollout failed: {0}")]
    Rollout(String),

    #[error("Unable to generate deployment id: {0}")]
    IdentifierGeneration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("{}", submission_message(.cause))]
    SubmissionFailure { cause: Option<String> },

    #[error("Deployment cancelled while waiting for the scheduler")]
    Cancelled,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl DeployError {
    /// Submission failure without any detail from the scheduler
    pub fn submission_failed() -> Self {
        DeployError::SubmissionFailure { cause: None }
    }
}

fn submission_message(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!("Unable to complete deployment: {}", cause),
        None => "Unable to complete deployment".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_message() {
        assert_eq!(
            DeployError::submission_failed().to_string(),
            "Unable to complete deployment"
        );
        let err = DeployError::SubmissionFailure {
            cause: Some("deployment failed".to_string()),
        };
        assert_eq!(err.to_string(), "Unable to complete deployment: deployment failed");
    }
}
