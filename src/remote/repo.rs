//! Repository references parsed from project git URLs.

use std::fmt;

use url::Url;

use super::RemoteError;

/// Owner and repository name on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Account or organisation that owns the repository.
    pub owner: String,
    /// Repository name, without any `.git` suffix.
    pub repo: String,
}

impl RepoRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `https://host/<owner>/<repo>[.git]`.
    ///
    /// The path must hold exactly two segments; anything else (extra path,
    /// trailing slash, missing repo) is rejected, since those URLs do not
    /// point at a repository root.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidRepoUrl`] when the URL does not parse or
    /// does not decompose into owner and repo.
    pub fn parse(git_url: &str) -> Result<Self, RemoteError> {
        let invalid = || RemoteError::invalid_repo_url(git_url);
        let url = Url::parse(git_url.trim()).map_err(|_| invalid())?;
        let segments: Vec<&str> = url.path_segments().ok_or_else(invalid)?.collect();
        let [owner, repo] = segments.as_slice() else {
            return Err(invalid());
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(*owner, repo))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_repo_url() {
        let repo = RepoRef::parse("https://github.com/example/caravel_user_project").unwrap();
        assert_eq!(repo, RepoRef::new("example", "caravel_user_project"));
        assert_eq!(repo.to_string(), "example/caravel_user_project");
    }

    #[test]
    fn test_parse_strips_git_suffix() {
        let repo = RepoRef::parse("https://github.com/example/tiny_cpu.git").unwrap();
        assert_eq!(repo.repo, "tiny_cpu");
    }

    #[test]
    fn test_parse_rejects_extra_segments() {
        assert!(RepoRef::parse("https://github.com/example/tiny_cpu/tree/main").is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_slash() {
        assert!(RepoRef::parse("https://github.com/example/tiny_cpu/").is_err());
    }

    #[test]
    fn test_parse_rejects_owner_only_and_sentinel() {
        assert!(RepoRef::parse("https://github.com/example").is_err());
        assert!(matches!(
            RepoRef::parse("n/a"),
            Err(RemoteError::InvalidRepoUrl { .. })
        ));
    }
}
