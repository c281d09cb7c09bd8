use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;

use crate::error::RoastError;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "RoastMeNow-App";

/// Public profile fields. Everything optional on GitHub's side is an
/// `Option` here so sparse profiles still roast fine.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub language: Option<String>,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub async fn fetch_user(&self, username: &str) -> Result<GithubUser, RoastError> {
        let response = self
            .http
            .get(format!("{API_BASE}/users/{username}"))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|err| RoastError::Other(err.into()))?;

        if is_rate_limited(&response) {
            return Err(RoastError::UpstreamRateLimited { service: "GitHub" });
        }
        if response.status().as_u16() == 404 {
            return Err(RoastError::UpstreamNotFound(username.to_string()));
        }
        if !response.status().is_success() {
            return Err(RoastError::Other(anyhow::anyhow!(
                "GitHub API error: {}",
                response.status()
            )));
        }

        let user: GithubUser = response
            .json()
            .await
            .map_err(|err| RoastError::Other(err.into()))?;
        info!("fetched GitHub profile for {}", user.login);
        Ok(user)
    }

    /// Recent repositories. Failures here degrade to an empty list so a
    /// roast can still be generated from profile data alone.
    pub async fn fetch_repos(&self, username: &str) -> Result<Vec<GithubRepo>, RoastError> {
        let response = self
            .http
            .get(format!(
                "{API_BASE}/users/{username}/repos?sort=updated&per_page=10"
            ))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|err| RoastError::Other(err.into()))?;

        if is_rate_limited(&response) {
            return Err(RoastError::UpstreamRateLimited { service: "GitHub" });
        }
        if !response.status().is_success() {
            warn!(
                "repo fetch for {username} failed with {}, continuing with profile only",
                response.status()
            );
            return Ok(Vec::new());
        }

        response
            .json()
            .await
            .map_err(|err| RoastError::Other(err.into()))
    }
}

fn is_rate_limited(response: &reqwest::Response) -> bool {
    response.status().as_u16() == 403
        && response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

/// Plain-text profile block fed to the roast generator.
pub fn profile_summary(user: &GithubUser, repos: &[GithubRepo]) -> String {
    let mut info = format!("GitHub Username: {}\n", user.login);
    info.push_str(&format!(
        "Name: {}\n",
        user.name.as_deref().unwrap_or("Not provided")
    ));
    info.push_str(&format!(
        "Bio: {}\n",
        user.bio.as_deref().unwrap_or("Not provided")
    ));
    info.push_str(&format!("Public Repos: {}\n", user.public_repos));
    info.push_str(&format!("Followers: {}\n", user.followers));
    info.push_str(&format!("Following: {}\n", user.following));
    info.push_str(&format!(
        "Account created: {}\n",
        user.created_at.format("%Y-%m-%d")
    ));
    info.push_str(&format!(
        "Location: {}\n\n",
        user.location.as_deref().unwrap_or("Not provided")
    ));

    info.push_str("Recent Repositories:\n");
    for repo in repos {
        info.push_str(&format!(
            "- {} ({}): {}\n",
            repo.name,
            repo.language.as_deref().unwrap_or("No language specified"),
            repo.description.as_deref().unwrap_or("No description")
        ));
        info.push_str(&format!(
            "  Stars: {}, Forks: {}, Last updated: {}\n",
            repo.stargazers_count,
            repo.forks_count,
            repo.updated_at.format("%Y-%m-%d")
        ));
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sparse_user() -> GithubUser {
        GithubUser {
            login: "octocat".into(),
            name: None,
            bio: None,
            location: None,
            public_repos: 2,
            followers: 1,
            following: 0,
            created_at: Utc.with_ymd_and_hms(2019, 4, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summary_tolerates_missing_optional_fields() {
        let summary = profile_summary(&sparse_user(), &[]);
        assert!(summary.contains("GitHub Username: octocat"));
        assert!(summary.contains("Name: Not provided"));
        assert!(summary.contains("Bio: Not provided"));
        assert!(summary.contains("Recent Repositories:"));
    }

    #[test]
    fn summary_lists_repo_details() {
        let repos = vec![GithubRepo {
            name: "dotfiles".into(),
            language: Some("Shell".into()),
            description: None,
            stargazers_count: 3,
            forks_count: 1,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }];
        let summary = profile_summary(&sparse_user(), &repos);
        assert!(summary.contains("- dotfiles (Shell): No description"));
        assert!(summary.contains("Stars: 3, Forks: 1"));
    }
}
