//! Deploy-time context supplied by the invoking orchestrator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A container image reference split into repository and tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Repository, including any registry host ("ghcr.io/acme/web")
    pub image: String,

    /// Tag, empty when the reference carried none
    pub tag: String,

    /// Content digest ("sha256:..."), empty when pinned by tag only
    #[serde(default)]
    pub digest: String,
}

impl ImageRef {
    pub fn new(image: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            tag: tag.into(),
            digest: String::new(),
        }
    }

    /// Split "repo[:tag][@digest]", ignoring a colon that belongs to a
    /// registry port
    pub fn parse(reference: &str) -> Self {
        let (named, digest) = match reference.split_once('@') {
            Some((named, digest)) => (named, digest),
            None => (reference, ""),
        };

        let last_slash = named.rfind('/').map(|i| i + 1).unwrap_or(0);
        let mut parsed = match named[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                Self::new(&named[..split], &named[split + 1..])
            }
            None => Self::new(named, ""),
        };
        parsed.digest = digest.to_string();
        parsed
    }

    /// Full reference, "image[:tag][@digest]"
    pub fn name(&self) -> String {
        let mut name = self.image.clone();
        if !self.tag.is_empty() {
            name.push(':');
            name.push_str(&self.tag);
        }
        if !self.digest.is_empty() {
            name.push('@');
            name.push_str(&self.digest);
        }
        name
    }
}

/// Everything about the deploy request that is not user configuration
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    /// Workspace the deployment belongs to
    pub workspace: String,

    /// Source application name
    pub app: String,

    /// Image produced upstream
    pub image: ImageRef,

    /// Environment the orchestrator wants on networked tasks
    pub env: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digest_reference() {
        let pinned = ImageRef::parse("nginx@sha256:abcd");
        assert_eq!(pinned.image, "nginx");
        assert_eq!(pinned.tag, "");
        assert_eq!(pinned.digest, "sha256:abcd");
        assert_eq!(pinned.name(), "nginx@sha256:abcd");

        let tagged = ImageRef::parse("registry.local:5000/web:1.2@sha256:ef01");
        assert_eq!(tagged.image, "registry.local:5000/web");
        assert_eq!(tagged.tag, "1.2");
        assert_eq!(tagged.digest, "sha256:ef01");
        assert_eq!(tagged.name(), "registry.local:5000/web:1.2@sha256:ef01");
    }

    #[test]
    fn test_parse_image_ref() {
        assert_eq!(ImageRef::parse("nginx:1.25"), ImageRef::new("nginx", "1.25"));
        assert_eq!(ImageRef::parse("nginx"), ImageRef::new("nginx", ""));
        assert_eq!(
            ImageRef::parse("registry.local:5000/team/web:abc123"),
            ImageRef::new("registry.local:5000/team/web", "abc123")
        );
        assert_eq!(
            ImageRef::parse("registry.local:5000/team/web"),
            ImageRef::new("registry.local:5000/team/web", "")
        );
    }

    #[test]
    fn test_image_name() {
        assert_eq!(ImageRef::new("ghcr.io/acme/web", "v2").name(), "ghcr.io/acme/web:v2");
        assert_eq!(ImageRef::new("ghcr.io/acme/web", "").name(), "ghcr.io/acme/web");
    }
}
