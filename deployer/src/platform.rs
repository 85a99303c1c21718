//! Host-facing deployment platform

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{ConfigResolver, DeployConfig};
use crate::deploy::context::DeployContext;
use crate::deploy::executor::DeployExecutor;
use crate::deploy::nomad::{NomadTrigger, TriggerOptions};
use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::models::deployment::Deployment;
use crate::template::LevantRenderer;
use crate::utils::UuidGenerator;

/// A deployment target the host orchestrator drives
#[async_trait]
pub trait Platform: Send + Sync {
    /// Replace the platform configuration
    fn configure(&mut self, config: DeployConfig) -> Result<(), DeployError>;

    /// Current platform configuration
    fn config(&self) -> &DeployConfig;

    /// Deploy an artifact, returning the record of what was deployed
    async fn deploy(&self, ctx: &DeployContext) -> Result<Deployment, DeployError>;
}

/// Nomad platform driven by a rendered job template
#[derive(Debug)]
pub struct TemplatedPlatform {
    config: DeployConfig,
    executor: DeployExecutor,
}

impl TemplatedPlatform {
    pub fn new(config: DeployConfig, executor: DeployExecutor) -> Self {
        Self { config, executor }
    }

    /// Platform with the levant renderer, the Nomad trigger and UUID ids
    pub fn with_defaults(config: DeployConfig, working_dir: Dir) -> Result<Self, DeployError> {
        let executor = DeployExecutor::new(
            ConfigResolver::new(working_dir.clone()),
            Arc::new(LevantRenderer::new(working_dir)?),
            Arc::new(NomadTrigger::new(TriggerOptions::default())?),
            Arc::new(UuidGenerator),
        );
        Ok(Self::new(config, executor))
    }

    /// Deploy, giving up when `cancel` resolves first.
    ///
    /// Cancellation only stops this process from waiting. A job that was
    /// already registered keeps rolling out on the cluster.
    pub async fn deploy_until<F>(
        &self,
        ctx: &DeployContext,
        cancel: F,
    ) -> Result<Deployment, DeployError>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.deploy(ctx) => result,
            _ = cancel => {
                warn!(
                    "Deploy of app {} cancelled, a submitted job may still roll out",
                    ctx.app
                );
                Err(DeployError::Cancelled)
            }
        }
    }
}

#[async_trait]
impl Platform for TemplatedPlatform {
    fn configure(&mut self, config: DeployConfig) -> Result<(), DeployError> {
        info!("Platform configured: {:?}", config.template_file);
        self.config = config;
        Ok(())
    }

    fn config(&self) -> &DeployConfig {
        &self.config
    }

    async fn deploy(&self, ctx: &DeployContext) -> Result<Deployment, DeployError> {
        self.executor.execute(&self.config, ctx).await
    }
}
