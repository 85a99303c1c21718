//! Deploy configuration surface

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-supplied deploy settings
///
/// Every field is optional; [`ConfigResolver`](crate::config::ConfigResolver)
/// fills in the defaults for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Nomad HTTP API endpoint ("http://localhost:4646")
    pub address: String,

    /// Consul host and port used for KV lookups while rendering
    /// ("localhost:8500")
    pub consul_address: String,

    /// Environment variables written into every task of the job
    pub static_environment: BTreeMap<String, String>,

    /// Variables for the job template. These take precedence over the same
    /// variable declared in a variable file.
    pub template_variables: BTreeMap<String, String>,

    /// Job template to render. When omitted a single `*.nomad` file in the
    /// working directory is used.
    pub template_file: Option<PathBuf>,

    /// Variable files, applied in order
    pub variable_files: Vec<PathBuf>,

    /// Load the Vault token from the process environment
    pub vault: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config: DeployConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DeployConfig::default());
        assert!(!config.vault);
        assert!(config.template_file.is_none());
    }

    #[test]
    fn test_full_config() {
        let config: DeployConfig = serde_json::from_str(
            r#"{
                "address": "http://nomad.service:4646",
                "consul_address": "consul.service:8500",
                "static_environment": {"MODE": "worker"},
                "template_variables": {"Region": "us-east"},
                "template_file": "deploy/web.nomad",
                "variable_files": ["defaults.vars", "prod.json"],
                "vault": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.address, "http://nomad.service:4646");
        assert_eq!(config.static_environment["MODE"], "worker");
        assert_eq!(config.template_variables["Region"], "us-east");
        assert_eq!(config.template_file, Some(PathBuf::from("deploy/web.nomad")));
        assert_eq!(config.variable_files.len(), 2);
        assert!(config.vault);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = serde_json::from_str::<DeployConfig>(r#"{"templte_file": "web.nomad"}"#);
        assert!(result.is_err());
    }
}
