//! Deployment environments.

use serde::{Deserialize, Serialize};

/// An environment as shown on the git provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Display name, e.g. `Staging`.
    pub name: String,
    /// Git URL of the environment repository.
    pub url: String,
}

impl Environment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Whether deployments to this environment count as production.
    pub fn is_production(&self) -> bool {
        self.name.to_lowercase().contains("prod")
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// Words are separated by any non-alphanumeric character, so `pre-prod`
/// becomes `Pre-Prod`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start_of_word = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("staging"), "Staging");
        assert_eq!(title_case("pre-prod"), "Pre-Prod");
        assert_eq!(title_case("PRODUCTION"), "Production");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_is_production() {
        assert!(Environment::new("Production", "").is_production());
        assert!(Environment::new("Pre-Prod", "").is_production());
        assert!(!Environment::new("Staging", "").is_production());
    }
}
