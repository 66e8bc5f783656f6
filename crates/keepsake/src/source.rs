//! Repositories as they come back from a code-host search.
//!
//! A [`SourceRepository`] is transient: it lives in search results and is
//! never persisted as-is. Favoriting one snapshots it into a
//! [`FavoriteRecord`](crate::FavoriteRecord).

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::favorite_repository::Model as FavoriteRecord;

/// Default web host used to build repository links.
pub const DEFAULT_WEB_HOST: &str = "github.com";

/// Owner of a repository (user or organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(rename = "avatar_url")]
    pub avatar_url: String,
}

/// A repository decoded from a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRepository {
    /// Platform id, canonicalized to its decimal string form.
    #[serde(deserialize_with = "canonical_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Owner,
    #[serde(rename = "stargazers_count")]
    pub star_count: i64,
}

impl SourceRepository {
    /// Key used to drop duplicates while paging through search results.
    ///
    /// Not a persistence key; favorites are keyed by their own id.
    pub fn unique_id(&self) -> String {
        format!("{}_{}_{}", self.id, self.name, self.owner.login)
    }

    /// Browser URL of the repository on `host`.
    pub fn html_url(&self, host: &str) -> String {
        repository_url(host, &self.owner.login, &self.name)
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

impl From<&FavoriteRecord> for SourceRepository {
    fn from(record: &FavoriteRecord) -> Self {
        Self {
            id: record.source_id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            owner: Owner {
                login: record.owner_login.clone(),
                avatar_url: record.owner_avatar_url.clone(),
            },
            star_count: record.star_count,
        }
    }
}

pub(crate) fn repository_url(host: &str, owner: &str, name: &str) -> String {
    let host = host
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{host}/{owner}/{name}")
}

/// Accept the numeric ids the API sends (and string ids, for fixtures).
fn canonical_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n.to_string()),
        RawId::Text(s) => Ok(s),
    }
}

#[cfg(test)]
pub(crate) fn sample(id: i64, name: &str, stars: i64) -> SourceRepository {
    SourceRepository {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        owner: Owner {
            login: "octocat".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/583231".to_string(),
        },
        star_count: stars,
    }
}
