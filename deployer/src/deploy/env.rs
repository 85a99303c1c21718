//! Per-task environment injection

use std::collections::BTreeMap;

use nomad_jobspec::Job;
use tracing::debug;

/// Overlays environment variables onto every task of a rendered job
///
/// Two layers are applied per task, in order:
/// 1. the static environment, on every task;
/// 2. the orchestrator's deployment environment, only on tasks whose group
///    declares a network.
///
/// Later layers overwrite earlier ones on key collision.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentInjector<'a> {
    static_env: &'a BTreeMap<String, String>,
    deployment_env: &'a BTreeMap<String, String>,
}

impl<'a> EnvironmentInjector<'a> {
    pub fn new(
        static_env: &'a BTreeMap<String, String>,
        deployment_env: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            static_env,
            deployment_env,
        }
    }

    pub fn inject(&self, job: &mut Job) {
        for group in job.task_groups.iter_mut() {
            let networked = group.networks.is_some();
            if !networked && !self.deployment_env.is_empty() {
                debug!(
                    "Task group {} declares no network, skipping {} deployment env vars",
                    group.name.as_deref().unwrap_or("<unnamed>"),
                    self.deployment_env.len()
                );
            }

            for task in group.tasks.iter_mut() {
                let env = task.env.get_or_insert_with(BTreeMap::new);
                env.extend(self.static_env.iter().map(|(k, v)| (k.clone(), v.clone())));
                if networked {
                    env.extend(self.deployment_env.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomad_jobspec::{NetworkResource, Task, TaskGroup};

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn group(name: &str, networks: Option<Vec<NetworkResource>>, tasks: usize) -> TaskGroup {
        TaskGroup {
            name: Some(name.to_string()),
            networks,
            tasks: (0..tasks)
                .map(|i| Task {
                    name: Some(format!("{name}-{i}")),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_static_env_everywhere() {
        let mut job = Job {
            task_groups: vec![
                group("web", Some(vec![NetworkResource::default()]), 2),
                group("batch", None, 3),
            ],
            ..Default::default()
        };
        let static_env = map(&[("MODE", "worker"), ("LOG", "info")]);
        let none = BTreeMap::new();

        EnvironmentInjector::new(&static_env, &none).inject(&mut job);

        for group in &job.task_groups {
            for task in &group.tasks {
                assert_eq!(task.env.as_ref(), Some(&static_env));
            }
        }
    }

    #[test]
    fn test_deployment_env_only_on_networked_groups() {
        let mut job = Job {
            task_groups: vec![
                group("web", Some(vec![NetworkResource::default()]), 1),
                group("batch", None, 1),
                group("sidecar", Some(vec![]), 1),
            ],
            ..Default::default()
        };
        let deploy_env = map(&[("PORT", "8080")]);
        let none = BTreeMap::new();

        EnvironmentInjector::new(&none, &deploy_env).inject(&mut job);

        let env_of = |i: usize| job.task_groups[i].tasks[0].env.clone().unwrap_or_default();
        assert_eq!(env_of(0).get("PORT").map(String::as_str), Some("8080"));
        assert!(!env_of(1).contains_key("PORT"));
        assert_eq!(env_of(2).get("PORT").map(String::as_str), Some("8080"));
    }

    #[test]
    fn test_layer_order_and_existing_env() {
        let mut web = group("web", Some(vec![NetworkResource::default()]), 1);
        web.tasks[0].env = Some(map(&[("KEEP", "me"), ("MODE", "template")]));
        let mut job = Job {
            task_groups: vec![web],
            ..Default::default()
        };

        let static_env = map(&[("MODE", "static"), ("SHARED", "static")]);
        let deploy_env = map(&[("SHARED", "deploy")]);
        EnvironmentInjector::new(&static_env, &deploy_env).inject(&mut job);

        let env = job.task_groups[0].tasks[0].env.as_ref().unwrap();
        assert_eq!(env["KEEP"], "me");
        assert_eq!(env["MODE"], "static");
        assert_eq!(env["SHARED"], "deploy");
    }

    #[test]
    fn test_env_created_even_when_layers_empty() {
        let mut job = Job {
            task_groups: vec![group("batch", None, 1)],
            ..Default::default()
        };
        let none = BTreeMap::new();

        EnvironmentInjector::new(&none, &none).inject(&mut job);
        assert_eq!(job.task_groups[0].tasks[0].env, Some(BTreeMap::new()));
    }
}
