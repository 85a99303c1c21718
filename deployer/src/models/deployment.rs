//! Deployment models

use nomad_jobspec::Job;
use serde::{Deserialize, Serialize};

/// The record returned to the host for a completed deploy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Tracking id, generated once per attempt
    pub id: String,

    /// Job name on the cluster
    pub name: String,
}

impl Deployment {
    /// Pre-submission record named `<app>-<id>`, lowercased
    pub fn candidate(app: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("{}-{}", app, id).to_lowercase(),
        }
    }

    /// Adopt the name the submitted job actually carries.
    ///
    /// Templates may name the job themselves; the host needs the real name to
    /// find or destroy the job later.
    pub fn reconcile(mut self, job: &Job) -> Self {
        if let Some(name) = job.name.as_ref().or(job.id.as_ref()) {
            self.name = name.clone();
        }
        self
    }
}

/// Reference to a job deployed on Nomad, as the host stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomadDeployment {
    pub id: String,
    pub name: String,
}

impl From<&Deployment> for NomadDeployment {
    fn from(src: &Deployment) -> Self {
        Self {
            id: src.id.clone(),
            name: src.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_name() {
        let deployment = Deployment::candidate("Billing-API", "01HQ7Z");
        assert_eq!(deployment.id, "01HQ7Z");
        assert_eq!(deployment.name, "billing-api-01hq7z");
    }

    #[test]
    fn test_reconcile_prefers_job_name() {
        let job = Job {
            id: Some("billing".to_string()),
            name: Some("Billing Service".to_string()),
            ..Default::default()
        };
        let deployment = Deployment::candidate("billing", "01HQ7Z").reconcile(&job);

        assert_eq!(deployment.name, "Billing Service");
        assert_eq!(deployment.id, "01HQ7Z");
    }

    #[test]
    fn test_reconcile_fallbacks() {
        let id_only = Job {
            id: Some("billing".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Deployment::candidate("app", "X").reconcile(&id_only).name,
            "billing"
        );

        let anonymous = Job::default();
        assert_eq!(
            Deployment::candidate("app", "X").reconcile(&anonymous).name,
            "app-x"
        );
    }

    #[test]
    fn test_nomad_mapping() {
        let deployment = Deployment {
            id: "01HQ7Z".to_string(),
            name: "web".to_string(),
        };
        let mapped = NomadDeployment::from(&deployment);
        assert_eq!(mapped.id, deployment.id);
        assert_eq!(mapped.name, deployment.name);
    }
}
