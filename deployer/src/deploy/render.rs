//! Template rendering seam

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nomad_jobspec::Job;

use crate::errors::DeployError;

/// Inputs for a single render
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub template_file: &'a Path,

    /// Variable files in precedence order, later files win
    pub variable_files: &'a [PathBuf],

    /// Merged variables, these win over any variable file
    pub variables: &'a BTreeMap<String, String>,

    /// Consul address for KV lookups, only the renderer interprets it
    pub consul_address: &'a str,
}

/// Renders a job template into a job specification
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    /// Render the template. Failures are reported as [`DeployError::Render`].
    async fn render(&self, request: RenderRequest<'_>) -> Result<Job, DeployError>;
}
