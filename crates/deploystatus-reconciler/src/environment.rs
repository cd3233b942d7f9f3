//! Namespace to environment resolution.

use deploystatus_config::Requirements;
use deploystatus_core::Environment;
use deploystatus_core::environment::title_case;
use std::collections::HashMap;

/// Maps deployment namespaces to provider environments.
///
/// Built once from the requirements; namespaces the requirements do not
/// mention still resolve, using the namespace name and the dev environment's
/// URL.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentResolver {
    names: HashMap<String, String>,
    urls: HashMap<String, String>,
}

impl EnvironmentResolver {
    pub fn from_requirements(requirements: &Requirements) -> Self {
        let mut resolver = Self::default();
        for env in &requirements.environments {
            let ns = env.namespace();
            let url = requirements.environment_git_url(&env.key);

            resolver.names.insert(ns.clone(), title_case(&env.key));
            if env.key == "dev" {
                resolver.urls.insert("dev".to_string(), url.clone());
            }
            resolver.urls.insert(ns, url);
        }
        resolver
    }

    pub fn resolve(&self, namespace: &str) -> Environment {
        let name = self
            .names
            .get(namespace)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| title_case(namespace.strip_prefix("jx-").unwrap_or(namespace)));
        let url = self
            .urls
            .get(namespace)
            .filter(|u| !u.is_empty())
            .or_else(|| self.urls.get("dev"))
            .cloned()
            .unwrap_or_default();
        Environment { name, url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploystatus_config::{ClusterConfig, EnvironmentConfig};

    const DEV_URL: &str = "https://github.com/jstrachan/jx-demo-gke2-dev.git";

    fn requirements() -> Requirements {
        Requirements {
            cluster: ClusterConfig {
                environment_git_owner: "jstrachan".to_string(),
                git_server: "https://github.com".to_string(),
                ..Default::default()
            },
            environments: vec![
                EnvironmentConfig {
                    key: "dev".to_string(),
                    repository: "jx-demo-gke2-dev".to_string(),
                    ..Default::default()
                },
                EnvironmentConfig {
                    key: "production".to_string(),
                    namespace: "prod-apps".to_string(),
                    repository: "jx-demo-gke2-production".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_declared_environment() {
        let resolver = EnvironmentResolver::from_requirements(&requirements());
        let env = resolver.resolve("prod-apps");
        assert_eq!(env.name, "Production");
        assert_eq!(
            env.url,
            "https://github.com/jstrachan/jx-demo-gke2-production.git"
        );

        let env = resolver.resolve("jx");
        assert_eq!(env.name, "Dev");
        assert_eq!(env.url, DEV_URL);
    }

    #[test]
    fn test_undeclared_namespace_falls_back() {
        let resolver = EnvironmentResolver::from_requirements(&requirements());
        let env = resolver.resolve("jx-staging");
        assert_eq!(env, Environment::new("Staging", DEV_URL));

        let env = resolver.resolve("pre-prod");
        assert_eq!(env, Environment::new("Pre-Prod", DEV_URL));
    }

    #[test]
    fn test_empty_requirements() {
        let resolver = EnvironmentResolver::from_requirements(&Requirements::default());
        assert_eq!(resolver.resolve("jx-staging"), Environment::new("Staging", ""));
    }
}
