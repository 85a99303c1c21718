//! Template variable merging

use std::collections::BTreeMap;

use crate::deploy::context::DeployContext;
use crate::models::deployment::Deployment;

/// Values known only at deploy time, always visible to the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextVariables {
    pub workspace: String,
    pub image_full: String,
    pub image_name: String,
    pub image_tag: String,
    pub deployment_id: String,
    pub deployment_app: String,
    pub deployment_name: String,
}

impl ContextVariables {
    pub fn new(ctx: &DeployContext, candidate: &Deployment) -> Self {
        Self {
            workspace: ctx.workspace.clone(),
            image_full: ctx.image.name(),
            image_name: ctx.image.image.clone(),
            image_tag: ctx.image.tag.clone(),
            deployment_id: candidate.id.clone(),
            deployment_app: ctx.app.clone(),
            deployment_name: candidate.name.clone(),
        }
    }

    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            (VariableMerger::WORKSPACE, self.workspace.as_str()),
            (VariableMerger::IMAGE_FULL, self.image_full.as_str()),
            (VariableMerger::IMAGE_NAME, self.image_name.as_str()),
            (VariableMerger::IMAGE_TAG, self.image_tag.as_str()),
            (VariableMerger::DEPLOYMENT_ID, self.deployment_id.as_str()),
            (VariableMerger::DEPLOYMENT_APP, self.deployment_app.as_str()),
            (VariableMerger::DEPLOYMENT_NAME, self.deployment_name.as_str()),
        ]
    }
}

/// Builds the variable map handed to the renderer
pub struct VariableMerger;

impl VariableMerger {
    pub const WORKSPACE: &'static str = "Workspace";
    pub const IMAGE_FULL: &'static str = "InputDockerImageFull";
    pub const IMAGE_NAME: &'static str = "InputDockerImageName";
    pub const IMAGE_TAG: &'static str = "InputDockerImageTag";
    pub const DEPLOYMENT_ID: &'static str = "DeploymentId";
    pub const DEPLOYMENT_APP: &'static str = "DeploymentApp";
    pub const DEPLOYMENT_NAME: &'static str = "DeploymentName";

    /// Every key owned by the deploy context
    pub const CONTEXT_KEYS: [&'static str; 7] = [
        Self::WORKSPACE,
        Self::IMAGE_FULL,
        Self::IMAGE_NAME,
        Self::IMAGE_TAG,
        Self::DEPLOYMENT_ID,
        Self::DEPLOYMENT_APP,
        Self::DEPLOYMENT_NAME,
    ];

    /// Copy the user's template variables and overlay the context values.
    ///
    /// Context values replace any user value under the same key. The input
    /// map is left untouched.
    pub fn merge(
        template_variables: &BTreeMap<String, String>,
        context: &ContextVariables,
    ) -> BTreeMap<String, String> {
        let mut merged = template_variables.clone();
        for (key, value) in context.entries() {
            merged.insert(key.to_string(), value.to_string());
        }
        merged
    }
}
