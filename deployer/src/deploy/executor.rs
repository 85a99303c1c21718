//! Deploy attempt executor

use std::sync::Arc;

use nomad_jobspec::Job;
use secrecy::ExposeSecret;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigResolver, DeployConfig, ResolvedConfig};
use crate::deploy::context::DeployContext;
use crate::deploy::env::EnvironmentInjector;
use crate::deploy::fsm::{AttemptEvent, AttemptFsm};
use crate::deploy::meta::MetadataTagger;
use crate::deploy::render::{RenderRequest, TemplateRenderer};
use crate::deploy::trigger::DeploymentTrigger;
use crate::deploy::variables::{ContextVariables, VariableMerger};
use crate::errors::DeployError;
use crate::models::deployment::Deployment;
use crate::utils::IdGenerator;

/// Runs the deploy pipeline for one attempt at a time.
///
/// Every call to [`DeployExecutor::execute`] is independent: it generates a
/// fresh tracking id, resolves its own configuration snapshot and never
/// mutates the caller's configuration.
#[derive(Clone)]
pub struct DeployExecutor {
    resolver: ConfigResolver,
    renderer: Arc<dyn TemplateRenderer>,
    trigger: Arc<dyn DeploymentTrigger>,
    ids: Arc<dyn IdGenerator>,
}

impl DeployExecutor {
    pub fn new(
        resolver: ConfigResolver,
        renderer: Arc<dyn TemplateRenderer>,
        trigger: Arc<dyn DeploymentTrigger>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            resolver,
            renderer,
            trigger,
            ids,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Run a deploy attempt end to end
    pub async fn execute(
        &self,
        config: &DeployConfig,
        ctx: &DeployContext,
    ) -> Result<Deployment, DeployError> {
        let mut fsm = AttemptFsm::new();

        match self.run(&mut fsm, config, ctx).await {
            Ok(deployment) => {
                info!(
                    "Deployment {} completed as job {}",
                    deployment.id, deployment.name
                );
                Ok(deployment)
            }
            Err(e) => {
                error!(
                    "Deploy attempt for app {} failed in state {:?}: {}",
                    ctx.app,
                    fsm.state(),
                    e
                );
                if !fsm.is_terminal() {
                    fsm.process(AttemptEvent::Abort(e.to_string()))?;
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        fsm: &mut AttemptFsm,
        config: &DeployConfig,
        ctx: &DeployContext,
    ) -> Result<Deployment, DeployError> {
        let id = self.ids.generate().map_err(|e| match e {
            DeployError::IdentifierGeneration(_) => e,
            other => DeployError::IdentifierGeneration(other.to_string()),
        })?;
        let candidate = Deployment::candidate(&ctx.app, &id);
        info!("Starting deployment {} for app {}", candidate.id, ctx.app);

        let resolved = self.resolver.resolve(config).await?;
        fsm.process(AttemptEvent::Resolve)?;
        debug!(
            "Resolved template {} against {}",
            resolved.template_file.display(),
            resolved.client.address
        );

        let variables = VariableMerger::merge(
            &resolved.template_variables,
            &ContextVariables::new(ctx, &candidate),
        );
        fsm.process(AttemptEvent::Merge)?;

        let mut job = self
            .renderer
            .render(RenderRequest {
                template_file: &resolved.template_file,
                variable_files: &resolved.variable_files,
                variables: &variables,
                consul_address: &resolved.client.consul_address,
            })
            .await
            .map_err(|e| match e {
                DeployError::Render(_) => e,
                other => DeployError::Render(other.to_string()),
            })?;
        fsm.process(AttemptEvent::Render)?;

        EnvironmentInjector::new(&resolved.static_environment, &ctx.env).inject(&mut job);
        fsm.process(AttemptEvent::Inject)?;

        MetadataTagger::tag(&mut job, &candidate.id);
        apply_vault_token(&mut job, &resolved);
        fsm.process(AttemptEvent::Tag)?;

        info!("Submitting job for deployment {}", candidate.id);
        let outcome = self.trigger.trigger(&job, &resolved.client).await;
        if !outcome.success {
            return Err(DeployError::SubmissionFailure {
                cause: outcome.cause,
            });
        }
        fsm.process(AttemptEvent::Submit)?;

        let deployment = candidate.reconcile(&job);
        fsm.process(AttemptEvent::Map)?;
        Ok(deployment)
    }
}

impl std::fmt::Debug for DeployExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployExecutor")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

fn apply_vault_token(job: &mut Job, resolved: &ResolvedConfig) {
    match &resolved.vault_token {
        Some(token) => job.vault_token = Some(token.expose_secret().to_string()),
        None if resolved.vault => {
            warn!("Vault is enabled but VAULT_TOKEN is not set, submitting without a token")
        }
        None => {}
    }
}
