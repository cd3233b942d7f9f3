//! Git provider kinds.

use serde::{Deserialize, Serialize};

pub const GITHUB_URL: &str = "https://github.com";

/// Git provider type
///
/// Kinds this tool has no client for are kept as `Other` so that configs
/// naming them still load; building a client for one fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GitKind {
    Github,
    Gitlab,
    Gitea,
    BitbucketServer,
    BitbucketCloud,
    Other(String),
}

impl GitKind {
    /// Infer the provider kind of a well-known SaaS git server.
    ///
    /// Self-hosted servers cannot be inferred and return `None`, except hosts
    /// starting with `https://github` which are assumed to be GitHub Enterprise.
    pub fn is_known(&self) -> bool {
        !matches!(self, GitKind::Other(_))
    }

    pub fn from_saas_server(server: &str) -> Option<Self> {
        let server = server.trim_end_matches('/');
        match server {
            "http://github.com" | "https://github.com" => Some(GitKind::Github),
            "http://gitlab.com" | "https://gitlab.com" => Some(GitKind::Gitlab),
            "http://bitbucket.org" | "https://bitbucket.org" => Some(GitKind::BitbucketCloud),
            _ if server.starts_with("https://github") => Some(GitKind::Github),
            _ => None,
        }
    }
}

/// Deserialize an optional kind, treating an empty string as absent.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<GitKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(GitKind::from(s))),
    }
}

impl std::fmt::Display for GitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitKind::Github => write!(f, "github"),
            GitKind::Gitlab => write!(f, "gitlab"),
            GitKind::Gitea => write!(f, "gitea"),
            GitKind::BitbucketServer => write!(f, "bitbucketserver"),
            GitKind::BitbucketCloud => write!(f, "bitbucketcloud"),
            GitKind::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for GitKind {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "github" => GitKind::Github,
            "gitlab" => GitKind::Gitlab,
            "gitea" => GitKind::Gitea,
            "bitbucketserver" => GitKind::BitbucketServer,
            "bitbucketcloud" => GitKind::BitbucketCloud,
            _ => GitKind::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for GitKind {
    fn from(s: String) -> Self {
        GitKind::from(s.as_str())
    }
}

impl From<GitKind> for String {
    fn from(kind: GitKind) -> Self {
        kind.to_string()
    }
}

impl std::str::FromStr for GitKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GitKind::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saas_inference() {
        assert_eq!(
            GitKind::from_saas_server("https://github.com/"),
            Some(GitKind::Github)
        );
        assert_eq!(
            GitKind::from_saas_server("https://gitlab.com"),
            Some(GitKind::Gitlab)
        );
        assert_eq!(
            GitKind::from_saas_server("https://bitbucket.org"),
            Some(GitKind::BitbucketCloud)
        );
        assert_eq!(
            GitKind::from_saas_server("https://github.example.com"),
            Some(GitKind::Github)
        );
        assert_eq!(GitKind::from_saas_server("https://git.example.com"), None);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("GitHub".parse::<GitKind>().unwrap(), GitKind::Github);
        assert_eq!(
            "bitbucketserver".parse::<GitKind>().unwrap(),
            GitKind::BitbucketServer
        );
        let other = "Azure".parse::<GitKind>().unwrap();
        assert_eq!(other, GitKind::Other("Azure".to_string()));
        assert!(!other.is_known());
        assert_eq!(other.to_string(), "Azure");
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Provider {
        #[serde(default, deserialize_with = "deserialize_optional")]
        git_kind: Option<GitKind>,
    }

    #[test]
    fn test_deserialize_optional() {
        let p: Provider = serde_yaml::from_str("gitKind: bitbucketserver").unwrap();
        assert_eq!(p.git_kind, Some(GitKind::BitbucketServer));

        let p: Provider = serde_yaml::from_str("gitKind: \"\"").unwrap();
        assert_eq!(p.git_kind, None);

        let p: Provider = serde_yaml::from_str("gitKind: azure").unwrap();
        assert_eq!(p.git_kind, Some(GitKind::Other("azure".to_string())));

        let p: Provider = serde_yaml::from_str("{}").unwrap();
        assert_eq!(p.git_kind, None);
    }
}
