//! Levant-style job template rendering

pub mod engine;
pub mod vars;

use std::path::PathBuf;

use async_trait::async_trait;
use nomad_jobspec::{parse_job, Job};
use tracing::{debug, info};

use crate::deploy::render::{RenderRequest, TemplateRenderer};
use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::http::client::{build_client, HttpClient};

use self::engine::KeyValueSource;
use self::vars::{load_variable_files, DEFAULT_VARIABLE_FILES};

/// Renders `[[ ]]` job templates into Nomad JSON jobs
#[derive(Debug, Clone)]
pub struct LevantRenderer {
    client: reqwest::Client,
    working_dir: Dir,
}

impl LevantRenderer {
    pub fn new(working_dir: Dir) -> Result<Self, DeployError> {
        Ok(Self {
            client: build_client()?,
            working_dir,
        })
    }

    /// First default variable file present in the working directory
    async fn default_variable_file(&self) -> Option<PathBuf> {
        for name in DEFAULT_VARIABLE_FILES {
            let file = self.working_dir.file(name);
            if file.exists().await {
                debug!("Using default variables file {}", file.path().display());
                return Some(file.path().to_path_buf());
            }
        }
        None
    }
}

#[async_trait]
impl TemplateRenderer for LevantRenderer {
    async fn render(&self, request: RenderRequest<'_>) -> Result<Job, DeployError> {
        let defaults;
        let variable_files = if request.variable_files.is_empty() {
            defaults = self.default_variable_file().await.into_iter().collect::<Vec<_>>();
            defaults.as_slice()
        } else {
            request.variable_files
        };

        let mut variables = load_variable_files(variable_files).await?;
        variables.extend(
            request
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let template_path = request.template_file;
        let template = File::new(template_path).read_string().await.map_err(|e| {
            DeployError::Render(format!(
                "failed to read template file {}: {}",
                template_path.display(),
                e
            ))
        })?;

        let consul = ConsulKv {
            client: self.client.clone(),
            address: request.consul_address,
        };
        let rendered = engine::render(&template, &variables, &consul)
            .await
            .map_err(|e| match e {
                DeployError::Render(msg) => {
                    DeployError::Render(format!("{}: {}", template_path.display(), msg))
                }
                other => other,
            })?;

        let job = parse_job(&rendered).map_err(|e| {
            DeployError::Render(format!(
                "rendered template {} is not a valid job: {}",
                template_path.display(),
                e
            ))
        })?;

        info!(
            "Rendered job template {} with {} variables",
            template_path.display(),
            variables.len()
        );
        Ok(job)
    }
}

/// Consul KV lookups for `consulKey`
struct ConsulKv<'a> {
    client: reqwest::Client,
    address: &'a str,
}

#[async_trait]
impl KeyValueSource for ConsulKv<'_> {
    async fn get(&self, key: &str) -> Result<Option<String>, DeployError> {
        HttpClient::with_client(self.client.clone(), self.address)?
            .kv_raw(key)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const TEMPLATE: &str = r#"{
  "Job": {
    "ID": "[[ .DeploymentName ]]",
    "Name": "[[ .DeploymentName ]]",
    "Datacenters": ["[[ .Region ]]"],
    "TaskGroups": [{"Name": "web", "Tasks": [{"Name": "app", "Config": {"image": "[[ .InputDockerImageFull ]]"}}]}]
  }
}"#;

    fn variables(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_render_with_default_variable_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("web.nomad");
        std::fs::write(&template, TEMPLATE).unwrap();
        std::fs::write(dir.path().join("levant.vars"), "Region=us-west\n").unwrap();

        let renderer = LevantRenderer::new(Dir::new(dir.path())).unwrap();
        let vars = variables(&[
            ("DeploymentName", "web-01"),
            ("InputDockerImageFull", "nginx:1.25"),
        ]);
        let job = renderer
            .render(RenderRequest {
                template_file: &template,
                variable_files: &[],
                variables: &vars,
                consul_address: "localhost:8500",
            })
            .await
            .unwrap();

        assert_eq!(job.id.as_deref(), Some("web-01"));
        assert_eq!(job.extra["Datacenters"][0], "us-west");
        assert_eq!(job.task_groups[0].tasks[0].extra["Config"]["image"], "nginx:1.25");
    }

    #[tokio::test]
    async fn test_request_variables_win_over_files() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("web.nomad");
        std::fs::write(&template, TEMPLATE).unwrap();
        let vars_file = dir.path().join("prod.json");
        std::fs::write(&vars_file, r#"{"Region": "us-west", "DeploymentName": "stale"}"#).unwrap();

        let renderer = LevantRenderer::new(Dir::new(dir.path())).unwrap();
        let vars = variables(&[
            ("Region", "us-east"),
            ("DeploymentName", "web-02"),
            ("InputDockerImageFull", "nginx:1.25"),
        ]);
        let files = [vars_file];
        let job = renderer
            .render(RenderRequest {
                template_file: &template,
                variable_files: &files,
                variables: &vars,
                consul_address: "localhost:8500",
            })
            .await
            .unwrap();

        assert_eq!(job.name.as_deref(), Some("web-02"));
        assert_eq!(job.extra["Datacenters"][0], "us-east");
    }

    #[tokio::test]
    async fn test_render_failures_are_render_errors() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LevantRenderer::new(Dir::new(dir.path())).unwrap();
        let vars = BTreeMap::new();

        let missing = dir.path().join("missing.nomad");
        let err = renderer
            .render(RenderRequest {
                template_file: &missing,
                variable_files: &[],
                variables: &vars,
                consul_address: "localhost:8500",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Render(_)));

        let broken = dir.path().join("broken.nomad");
        std::fs::write(&broken, "{\"Job\": [[ .Nope ]]}").unwrap();
        let err = renderer
            .render(RenderRequest {
                template_file: &broken,
                variable_files: &[],
                variables: &vars,
                consul_address: "localhost:8500",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Render(_)));
        assert!(err.to_string().contains("Nope"));

        let not_json = dir.path().join("hcl.nomad");
        std::fs::write(&not_json, "job \"web\" {}").unwrap();
        let err = renderer
            .render(RenderRequest {
                template_file: &not_json,
                variable_files: &[],
                variables: &vars,
                consul_address: "localhost:8500",
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a valid job"));
    }
}
