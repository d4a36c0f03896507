//! Unified result shape and the raw upstream records it is normalized from.

use serde::Deserialize;

/// Discriminant of a [`SearchResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// An account (user or organization)
    User,
    /// A repository
    Repository,
}

/// An account matching the query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserResult {
    /// Unique within a single result list
    pub id: String,
    /// The account login
    pub name: String,
    /// Profile page
    pub url: String,
    /// Avatar image URL
    pub avatar: Option<String>,
}

/// A repository matching the query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryResult {
    /// Unique within a single result list
    pub id: String,
    /// The repository name, without its owner
    pub name: String,
    /// Repository page
    pub url: String,
    /// Login of the owning account
    pub owner: Option<String>,
    /// Avatar of the owning account
    pub owner_avatar: Option<String>,
    /// Short description, `None` when upstream has none
    pub description: Option<String>,
    /// Stargazer count
    pub stars: u64,
    /// Fork count
    pub forks: u64,
    /// Primary language, `None` when upstream could not detect one
    pub language: Option<String>,
}

/// One row of the merged result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// An account
    User(UserResult),
    /// A repository
    Repository(RepositoryResult),
}

impl SearchResult {
    /// Identifier, unique only within the list it came from
    pub fn id(&self) -> &str {
        match self {
            SearchResult::User(u) => &u.id,
            SearchResult::Repository(r) => &r.id,
        }
    }

    /// Display name, also used as the sort key when merging
    pub fn name(&self) -> &str {
        match self {
            SearchResult::User(u) => &u.name,
            SearchResult::Repository(r) => &r.name,
        }
    }

    /// Target opened on commit
    pub fn url(&self) -> &str {
        match self {
            SearchResult::User(u) => &u.url,
            SearchResult::Repository(r) => &r.url,
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> ResultKind {
        match self {
            SearchResult::User(_) => ResultKind::User,
            SearchResult::Repository(_) => ResultKind::Repository,
        }
    }
}

impl From<UserResult> for SearchResult {
    fn from(value: UserResult) -> Self {
        SearchResult::User(value)
    }
}

impl From<RepositoryResult> for SearchResult {
    fn from(value: RepositoryResult) -> Self {
        SearchResult::Repository(value)
    }
}

//------------------------------------------------------------------------------
// Upstream records

/// Envelope of both search endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Error body returned on non-success responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    pub id: u64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOwner {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepository {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub owner: Option<RawOwner>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

impl From<RawUser> for UserResult {
    fn from(raw: RawUser) -> Self {
        Self {
            id: format!("user-{}", raw.id),
            name: raw.login.unwrap_or_default(),
            url: raw.html_url.unwrap_or_default(),
            avatar: raw.avatar_url,
        }
    }
}

impl From<RawRepository> for RepositoryResult {
    fn from(raw: RawRepository) -> Self {
        let (owner, owner_avatar) = match raw.owner {
            Some(o) => (o.login, o.avatar_url),
            None => (None, None),
        };
        Self {
            id: format!("repo-{}", raw.id),
            name: raw.name.unwrap_or_default(),
            url: raw.html_url.unwrap_or_default(),
            owner,
            owner_avatar,
            description: raw.description,
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            language: raw.language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_keeps_nulls() {
        let raw: RawRepository = serde_json::from_str(
            r#"{"id": 7, "name": "cool-lib", "html_url": "https://github.com/a/cool-lib",
                "description": null, "language": null, "stargazers_count": 3, "forks_count": 1}"#,
        )
        .unwrap();
        let repo = RepositoryResult::from(raw);
        assert_eq!(repo.id, "repo-7");
        assert_eq!(repo.description, None);
        assert_eq!(repo.language, None);
        assert_eq!(repo.owner, None);
        assert_eq!(repo.owner_avatar, None);
        assert_eq!((repo.stars, repo.forks), (3, 1));
    }

    #[test]
    fn user_and_repository_ids_do_not_collide() {
        let user: SearchResult = UserResult::from(RawUser {
            id: 1,
            login: Some("octocat".into()),
            html_url: None,
            avatar_url: None,
        })
        .into();
        let repo: SearchResult = RepositoryResult::from(RawRepository {
            id: 1,
            name: Some("octocat".into()),
            html_url: None,
            owner: None,
            description: None,
            stargazers_count: 0,
            forks_count: 0,
            language: None,
        })
        .into();
        assert_ne!(user.id(), repo.id());
        assert_eq!(user.kind(), ResultKind::User);
        assert_eq!(repo.kind(), ResultKind::Repository);
    }
}
