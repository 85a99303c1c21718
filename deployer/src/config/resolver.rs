//! Configuration resolution for a single deploy attempt

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::debug;

use crate::config::settings::DeployConfig;
use crate::errors::DeployError;
use crate::filesys::dir::Dir;

pub const DEFAULT_NOMAD_ADDRESS: &str = "http://localhost:4646";
pub const DEFAULT_CONSUL_ADDRESS: &str = "localhost:8500";
pub const TEMPLATE_EXTENSION: &str = "nomad";

const NOMAD_ADDR_ENV: &str = "NOMAD_ADDR";
const NOMAD_TOKEN_ENV: &str = "NOMAD_TOKEN";
const CONSUL_ADDR_ENV: &str = "CONSUL_HTTP_ADDR";
const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Connection settings for the scheduler and the KV store
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Nomad HTTP API endpoint
    pub address: String,

    /// Consul host and port for template KV lookups
    pub consul_address: String,

    /// Nomad ACL token
    pub token: Option<SecretString>,
}

/// Fully populated configuration for one deploy attempt
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub client: ClientConfig,
    pub static_environment: BTreeMap<String, String>,
    pub template_variables: BTreeMap<String, String>,
    pub template_file: PathBuf,
    pub variable_files: Vec<PathBuf>,
    pub vault: bool,

    /// Set only when `vault` is enabled and the token is present
    pub vault_token: Option<SecretString>,
}

/// Resolves a [`DeployConfig`] into a [`ResolvedConfig`]
#[derive(Clone)]
pub struct ConfigResolver {
    working_dir: Dir,
    env: EnvLookup,
}

impl ConfigResolver {
    /// Resolver discovering templates in `working_dir` and reading the
    /// process environment
    pub fn new(working_dir: Dir) -> Self {
        Self {
            working_dir,
            env: Arc::new(|key| std::env::var(key).ok().filter(|v| !v.is_empty())),
        }
    }

    /// Replace the environment lookup
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    pub fn working_dir(&self) -> &Dir {
        &self.working_dir
    }

    /// Resolve the configuration
    pub async fn resolve(&self, config: &DeployConfig) -> Result<ResolvedConfig, DeployError> {
        let template_file = match &config.template_file {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => self.discover_template().await?,
        };

        let address = non_empty(&config.address)
            .or_else(|| (self.env)(NOMAD_ADDR_ENV))
            .unwrap_or_else(|| DEFAULT_NOMAD_ADDRESS.to_string());

        let consul_address = non_empty(&config.consul_address)
            .or_else(|| (self.env)(CONSUL_ADDR_ENV))
            .unwrap_or_else(|| DEFAULT_CONSUL_ADDRESS.to_string());

        let vault_token = if config.vault {
            (self.env)(VAULT_TOKEN_ENV).map(SecretString::from)
        } else {
            None
        };

        Ok(ResolvedConfig {
            client: ClientConfig {
                address,
                consul_address,
                token: (self.env)(NOMAD_TOKEN_ENV).map(SecretString::from),
            },
            static_environment: config.static_environment.clone(),
            template_variables: config.template_variables.clone(),
            template_file,
            variable_files: config.variable_files.clone(),
            vault: config.vault,
            vault_token,
        })
    }

    /// Find the single `*.nomad` file in the working directory
    pub async fn discover_template(&self) -> Result<PathBuf, DeployError> {
        let missing = || {
            DeployError::Configuration("template file missing and no default found".to_string())
        };

        let matches = self
            .working_dir
            .files_with_extension(TEMPLATE_EXTENSION)
            .await
            .map_err(|_| missing())?;

        match matches.as_slice() {
            [single] => {
                debug!("Using templated job file {}", single.display());
                Ok(single.clone())
            }
            [] => Err(missing()),
            many => {
                debug!(
                    "Found {} candidate job files in {}, refusing to guess: {:?}",
                    many.len(),
                    self.working_dir.path().display(),
                    many
                );
                Err(missing())
            }
        }
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
