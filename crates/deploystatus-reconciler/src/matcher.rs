//! Repository identity resolution from chart sources.
//!
//! Chart names often differ from the repository that builds them. The chart
//! records its source URLs, which are used to find the real repository on the
//! provider being updated.

use deploystatus_core::{FullRepoName, GitRepository};

/// Result of resolving a release's repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMatch {
    pub repository: FullRepoName,
    /// Sources that could not be parsed, with the parse error.
    pub unparsable: Vec<(String, String)>,
}

/// Resolves repositories for one provider and owner.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryMatcher<'a> {
    provider: &'a str,
    owner: &'a str,
}

impl<'a> RepositoryMatcher<'a> {
    /// `provider` is the git server URL being updated and `owner` the owner
    /// of the repository group.
    pub fn new(provider: &'a str, owner: &'a str) -> Self {
        Self { provider, owner }
    }

    /// Pick the repository to report against.
    ///
    /// Only sources hosted on the provider count. A source containing the
    /// assumed name confirms it. Otherwise the last source under the same
    /// owner wins, then the last source under any other owner, and failing
    /// both the assumed name is kept.
    pub fn resolve(&self, assumed: &FullRepoName, sources: &[String]) -> RepositoryMatch {
        let assumed_text = assumed.to_string();
        let mut unparsable = Vec::new();
        let mut confirmed = false;
        let mut same_owner: Option<GitRepository> = None;
        let mut other_owner: Option<GitRepository> = None;

        for source in sources {
            let info = match GitRepository::parse(source) {
                Ok(info) => info,
                Err(e) => {
                    unparsable.push((source.clone(), e.to_string()));
                    continue;
                }
            };
            if !self.provider.contains(info.host.as_str()) {
                continue;
            }

            if source.contains(&assumed_text) {
                confirmed = true;
            } else if info.organisation == self.owner {
                same_owner = Some(info);
            } else {
                other_owner = Some(info);
            }
        }

        let repository = if confirmed {
            assumed.clone()
        } else {
            same_owner
                .or(other_owner)
                .map(|info| info.full_name())
                .unwrap_or_else(|| assumed.clone())
        };

        RepositoryMatch {
            repository,
            unparsable,
        }
    }
}
