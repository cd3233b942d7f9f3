//! Deployment reconciliation for a single repository and environment.

use chrono::{DateTime, Utc};
use deploystatus_core::{
    Deployment, DeploymentInput, DeploymentService, DeploymentStatusInput, Environment, FullRepoName,
    GitKind, Release, Result,
};
use deploystatus_scm::ScmClientRegistry;

use crate::event::{ReconcileEvent, Reconciliation, SkipReason};
use crate::matcher::RepositoryMatcher;

/// Where a release is reported: the repository group's provider and owner
/// plus the repository name assumed from the release.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileTarget<'a> {
    pub owner: &'a str,
    pub provider: &'a str,
    pub kind: Option<&'a GitKind>,
    pub repository: &'a str,
}

/// Settings shared by every reconciliation in a run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Mark earlier statuses inactive when a new one is created.
    pub auto_inactive: bool,
    /// Only releases deployed after this instant are reconciled.
    pub deploy_cutoff: Option<DateTime<Utc>>,
}

/// Compares a release with the provider's deployments and creates the
/// deployment and status records that are missing.
#[derive(Debug, Clone, Default)]
pub struct DeploymentReconciler {
    options: ReconcileOptions,
}

impl DeploymentReconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconcile one release into one environment.
    ///
    /// Returns the recorded events; provider errors abort this unit only and
    /// are returned to the caller.
    pub async fn reconcile(
        &self,
        registry: &mut ScmClientRegistry,
        target: ReconcileTarget<'_>,
        environment: &Environment,
        release: &Release,
    ) -> Result<Reconciliation> {
        let assumed = FullRepoName::new(target.owner, target.repository);
        let mut outcome = Reconciliation::new(assumed.clone(), environment.clone(), &release.name);

        if release.version.is_empty() {
            return Ok(outcome.skip(SkipReason::MissingVersion));
        }
        if let Some(cutoff) = self.options.deploy_cutoff {
            if !release.deployed_after(cutoff) {
                return Ok(outcome.skip(SkipReason::OutsideDeployWindow {
                    last_deployed: release.last_deployed,
                    cutoff,
                }));
            }
        }

        let client = registry.get_or_create(target.owner, target.provider, target.kind.cloned())?;

        let matched =
            RepositoryMatcher::new(target.provider, target.owner).resolve(&assumed, &release.sources);
        for (source, message) in matched.unparsable {
            outcome.push(ReconcileEvent::SourceUnparsable { source, message });
        }
        let repo = matched.repository;
        if repo != assumed {
            outcome.push(ReconcileEvent::RepositoryRedirected {
                from: assumed,
                to: repo.clone(),
            });
        }
        outcome.repository = repo.clone();

        let Some(deployments) = client.deployments() else {
            return Ok(outcome.skip(SkipReason::DeploymentsUnsupported {
                server: target.provider.to_string(),
            }));
        };

        let git_ref = format!("v{}", release.version);
        let deployment = match find_deployment(deployments, &repo, &environment.name).await? {
            Some(existing) => {
                outcome.push(ReconcileEvent::ExistingDeployment {
                    id: existing.id.clone(),
                    link: existing.link.clone(),
                    git_ref: existing.git_ref.clone(),
                });
                if existing.git_ref == git_ref {
                    return Ok(outcome.skip(SkipReason::Unchanged { git_ref }));
                }
                existing
            }
            None => {
                let input = deployment_input(&repo, environment, &git_ref);
                let created = deployments.create_deployment(&repo, &input).await?;
                outcome.push(ReconcileEvent::DeploymentCreated {
                    id: created.id.clone(),
                    link: created.link.clone(),
                    git_ref: git_ref.clone(),
                });
                created
            }
        };

        let input = DeploymentStatusInput {
            state: "success".to_string(),
            target_link: release.application_url.clone(),
            log_link: release.logs_url.clone(),
            description: format!(
                "Deployment {}",
                release.version.strip_prefix('v').unwrap_or(&release.version)
            ),
            environment: environment.name.clone(),
            environment_link: environment.url.clone(),
            auto_inactive: self.options.auto_inactive,
        };
        let status = deployments
            .create_deployment_status(&repo, &deployment.id, &input)
            .await?;
        outcome.push(ReconcileEvent::StatusCreated {
            deployment_id: deployment.id,
            status_id: status.id,
            git_ref,
            log_link: input.log_link,
            target_link: input.target_link,
        });

        Ok(outcome)
    }
}

/// Find the deployment of `repo` into `environment`.
///
/// The first deployment whose name and environment match is used; a
/// repository the provider does not know has no deployments.
async fn find_deployment(
    deployments: &dyn DeploymentService,
    repo: &FullRepoName,
    environment: &str,
) -> Result<Option<Deployment>> {
    let existing = match deployments.list_deployments(repo).await {
        Ok(existing) => existing,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e),
    };
    Ok(existing
        .into_iter()
        .find(|d| d.name == repo.name && d.environment == environment))
}

fn deployment_input(repo: &FullRepoName, environment: &Environment, git_ref: &str) -> DeploymentInput {
    DeploymentInput {
        git_ref: git_ref.to_string(),
        task: "deploy".to_string(),
        environment: environment.name.clone(),
        description: format!(
            "release {} for version {}",
            repo.name,
            git_ref.strip_prefix('v').unwrap_or(git_ref)
        ),
        production_environment: environment.is_production(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploystatus_core::ScmClient;
    use deploystatus_scm::{ClientFactory, FakeDeployments};
    use std::sync::Arc;

    const SERVER: &str = "https://fake.com";
    const OWNER: &str = "fakeOwner";
    const REPO: &str = "fakeRepo";

    struct NoFactory;

    impl ClientFactory for NoFactory {
        fn create(&self, _kind: GitKind, server: &str) -> Result<ScmClient> {
            panic!("unexpected client creation for {}", server)
        }
    }

    fn repo() -> FullRepoName {
        FullRepoName::new(OWNER, REPO)
    }

    fn registry(fake: &Arc<FakeDeployments>) -> ScmClientRegistry {
        let mut registry = ScmClientRegistry::new(Box::new(NoFactory));
        registry.insert(
            SERVER,
            ScmClient::deploying(GitKind::Github, SERVER, fake.clone()),
        );
        registry
    }

    fn target() -> ReconcileTarget<'static> {
        ReconcileTarget {
            owner: OWNER,
            provider: SERVER,
            kind: None,
            repository: REPO,
        }
    }

    fn production() -> Environment {
        Environment::new("Production", "https://github.com/jstrachan/jx-demo-gke2-dev.git")
    }

    fn release(version: &str) -> Release {
        Release {
            name: REPO.to_string(),
            version: version.to_string(),
            last_deployed: Some("2023-01-25T09:38:47Z".parse().unwrap()),
            application_url: "http://fakerepo.example.com".to_string(),
            logs_url: "http://logs.example.com".to_string(),
            ..Default::default()
        }
    }

    fn existing(id: &str, git_ref: &str, environment: &str) -> Deployment {
        Deployment {
            id: id.to_string(),
            namespace: OWNER.to_string(),
            name: REPO.to_string(),
            git_ref: git_ref.to_string(),
            environment: environment.to_string(),
            task: "deploy".to_string(),
            ..Default::default()
        }
    }

    fn reconciler() -> DeploymentReconciler {
        DeploymentReconciler::new(ReconcileOptions {
            auto_inactive: true,
            deploy_cutoff: Some("2023-01-25T08:38:47Z".parse().unwrap()),
        })
    }

    #[tokio::test]
    async fn test_missing_version_makes_no_calls() {
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &release(""))
            .await
            .unwrap();

        assert_eq!(outcome.skipped(), Some(&SkipReason::MissingVersion));
        assert_eq!(fake.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_outside_deploy_window_makes_no_calls() {
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        let mut old = release("0.0.2");
        old.last_deployed = Some("2023-01-25T07:00:00Z".parse().unwrap());
        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &old)
            .await
            .unwrap();
        assert!(matches!(
            outcome.skipped(),
            Some(SkipReason::OutsideDeployWindow { .. })
        ));

        let mut never = release("0.0.2");
        never.last_deployed = None;
        reconciler()
            .reconcile(&mut registry, target(), &production(), &never)
            .await
            .unwrap();

        assert_eq!(fake.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_no_cutoff_reconciles_old_releases() {
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        let mut old = release("0.0.2");
        old.last_deployed = None;
        let outcome = DeploymentReconciler::default()
            .reconcile(&mut registry, target(), &production(), &old)
            .await
            .unwrap();

        assert_eq!(outcome.skipped(), None);
        assert_eq!(fake.deployments(&repo()).len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_ref_is_idempotent() {
        let fake = Arc::new(FakeDeployments::new().with_deployments(
            &repo(),
            vec![
                existing("deployment-1", "v0.0.2", "Production"),
                existing("deployment-2", "v0.0.2", "Staging"),
            ],
        ));
        let mut registry = registry(&fake);

        for _ in 0..3 {
            let outcome = reconciler()
                .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
                .await
                .unwrap();
            assert_eq!(
                outcome.skipped(),
                Some(&SkipReason::Unchanged {
                    git_ref: "v0.0.2".to_string()
                })
            );
        }

        assert_eq!(fake.deployments(&repo()).len(), 2);
        assert_eq!(fake.status_count(), 0);
        assert_eq!(fake.calls().create_deployment, 0);
    }

    #[tokio::test]
    async fn test_changed_ref_adds_status_to_existing_deployment() {
        let fake = Arc::new(FakeDeployments::new().with_deployments(
            &repo(),
            vec![
                existing("deployment-1", "v0.0.1", "Production"),
                existing("deployment-2", "v0.0.1", "Staging"),
            ],
        ));
        let mut registry = registry(&fake);

        reconciler()
            .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
            .await
            .unwrap();

        assert_eq!(fake.deployments(&repo()).len(), 2);
        let statuses = fake.statuses(&repo(), "deployment-1");
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].state, "success");
        assert_eq!(statuses[0].description, "Deployment 0.0.2");
        assert_eq!(statuses[0].environment, "Production");
        assert_eq!(
            statuses[0].environment_link,
            "https://github.com/jstrachan/jx-demo-gke2-dev.git"
        );
        assert_eq!(statuses[0].target_link, "http://fakerepo.example.com");
        assert_eq!(statuses[0].log_link, "http://logs.example.com");
        assert_eq!(fake.status_count(), 1);
    }

    #[tokio::test]
    async fn test_first_matching_deployment_wins() {
        let fake = Arc::new(FakeDeployments::new().with_deployments(
            &repo(),
            vec![
                existing("deployment-1", "v0.0.1", "Production"),
                existing("deployment-2", "v0.0.2", "Staging"),
                existing("deployment-3", "v0.0.2", "Production"),
            ],
        ));
        let mut registry = registry(&fake);

        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
            .await
            .unwrap();

        assert_eq!(outcome.skipped(), None);
        assert_eq!(fake.statuses(&repo(), "deployment-1").len(), 1);
        assert!(fake.statuses(&repo(), "deployment-3").is_empty());
        assert_eq!(fake.calls().create_deployment, 0);
        assert_eq!(fake.deployments(&repo()).len(), 3);
    }

    #[tokio::test]
    async fn test_no_existing_deployment_creates_one() {
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
            .await
            .unwrap();

        let deployments = fake.deployments(&repo());
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].git_ref, "v0.0.2");
        assert_eq!(deployments[0].task, "deploy");
        assert_eq!(deployments[0].environment, "Production");
        assert_eq!(deployments[0].description, "release fakeRepo for version 0.0.2");
        assert!(deployments[0].production_environment);
        assert_eq!(fake.statuses(&repo(), &deployments[0].id).len(), 1);

        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, ReconcileEvent::DeploymentCreated { .. })));
    }

    #[tokio::test]
    async fn test_staging_is_not_production() {
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        reconciler()
            .reconcile(
                &mut registry,
                target(),
                &Environment::new("Staging", ""),
                &release("v0.0.3"),
            )
            .await
            .unwrap();

        let deployments = fake.deployments(&repo());
        assert!(!deployments[0].production_environment);
        // a leading v in the version is kept in the ref but not the description
        assert_eq!(deployments[0].git_ref, "vv0.0.3");
        let statuses = fake.statuses(&repo(), &deployments[0].id);
        assert_eq!(statuses[0].description, "Deployment 0.0.3");
    }

    #[tokio::test]
    async fn test_missing_capability_is_not_an_error() {
        let mut registry = ScmClientRegistry::new(Box::new(NoFactory));
        registry.insert(SERVER, ScmClient::basic(GitKind::Gitlab, SERVER));

        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
            .await
            .unwrap();

        assert!(matches!(
            outcome.skipped(),
            Some(SkipReason::DeploymentsUnsupported { .. })
        ));
        assert_eq!(outcome.warnings().count(), 1);
    }

    #[tokio::test]
    async fn test_redirects_to_source_repository() {
        let actual = FullRepoName::new(OWNER, "actual-repo");
        let fake = Arc::new(FakeDeployments::new());
        let mut registry = registry(&fake);

        let mut rel = release("0.0.2");
        rel.sources = vec!["https://fake.com/fakeOwner/actual-repo".to_string()];
        let outcome = reconciler()
            .reconcile(&mut registry, target(), &production(), &rel)
            .await
            .unwrap();

        assert_eq!(outcome.repository, actual);
        assert!(fake.deployments(&repo()).is_empty());
        let deployments = fake.deployments(&actual);
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].name, "actual-repo");
    }

    #[tokio::test]
    async fn test_provider_error_is_returned() {
        let fake = Arc::new(FakeDeployments::new().failing(&repo()));
        let mut registry = registry(&fake);

        let err = reconciler()
            .reconcile(&mut registry, target(), &production(), &release("0.0.2"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fakeOwner/fakeRepo"));
        assert_eq!(fake.calls().create_deployment, 0);
    }
}
