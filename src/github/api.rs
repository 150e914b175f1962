//! NF-012: GitHub API client.
//!
//! Lists recipe directories (`recipes/<name>/build.yaml`) with last-commit
//! metadata and fetches raw recipe files. Response parsing is split into
//! pure functions so it is testable without a network.

use serde::{Deserialize, Serialize};

pub const DEFAULT_OWNER: &str = "neurodesk";
pub const DEFAULT_REPO: &str = "neurocontainers";
pub const DEFAULT_BRANCH: &str = "main";

const USER_AGENT: &str = concat!("neuroforge/", env!("CARGO_PKG_VERSION"));

/// One recipe in the repository listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeListing {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
}

/// Last-commit metadata for a recipe file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: String,
}

/// Blocking GitHub client.
#[derive(Debug)]
pub struct GitHubClient {
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
    api_base: String,
    raw_base: String,
    http: reqwest::blocking::Client,
}

impl GitHubClient {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Result<Self, String> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("cannot build HTTP client: {}", e))?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            token: None,
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            http,
        })
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Point at different endpoints (tests, GitHub Enterprise).
    pub fn with_endpoints(mut self, api_base: &str, raw_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.raw_base = raw_base.trim_end_matches('/').to_string();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn get(&self, url: &str) -> Result<String, String> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| format!("request to {} failed: {} — check network and retry", url, e))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| format!("cannot read response from {}: {}", url, e))?;

        if !status.is_success() {
            return Err(format!(
                "GET {} returned {} — retry later or pass a token",
                url, status
            ));
        }
        Ok(body)
    }

    /// List recipe directories. With `with_commits`, each entry also gets
    /// its build.yaml's last-commit metadata (one extra request per
    /// recipe); a failed metadata lookup leaves the entry without one
    /// rather than failing the listing.
    pub fn list_recipes(&self, with_commits: bool) -> Result<Vec<RecipeListing>, String> {
        let url = format!(
            "{}/repos/{}/{}/contents/recipes?ref={}",
            self.api_base, self.owner, self.repo, self.branch
        );
        let body = self.get(&url)?;
        let mut listings = parse_content_listing(&body)?;

        if with_commits {
            for listing in &mut listings {
                let path = format!("recipes/{}/build.yaml", listing.name);
                listing.commit = self.last_commit(&path).ok().flatten();
            }
        }

        Ok(listings)
    }

    /// Last commit touching a path on the client's branch.
    pub fn last_commit(&self, path: &str) -> Result<Option<CommitInfo>, String> {
        let url = format!(
            "{}/repos/{}/{}/commits?path={}&sha={}&per_page=1",
            self.api_base,
            self.owner,
            self.repo,
            urlencoding::encode(path),
            self.branch
        );
        let body = self.get(&url)?;
        parse_commit_list(&body)
    }

    /// Raw URL of a recipe's build.yaml.
    pub fn recipe_url(&self, name: &str) -> String {
        format!(
            "{}/{}/{}/{}/recipes/{}/build.yaml",
            self.raw_base, self.owner, self.repo, self.branch, name
        )
    }

    /// Download a recipe's build.yaml.
    pub fn fetch_recipe_yaml(&self, name: &str) -> Result<String, String> {
        self.get(&self.recipe_url(name))
    }
}

// ============================================================================
// Response parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    entry_type: String,
}

/// Parse a contents-API listing, keeping directories only.
pub fn parse_content_listing(json: &str) -> Result<Vec<RecipeListing>, String> {
    let entries: Vec<ContentEntry> =
        serde_json::from_str(json).map_err(|e| format!("unexpected listing response: {}", e))?;
    Ok(entries
        .into_iter()
        .filter(|e| e.entry_type == "dir")
        .map(|e| RecipeListing {
            name: e.name,
            path: e.path,
            sha: e.sha,
            commit: None,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CommitEnvelope {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: String,
    date: String,
}

/// Parse a commits-API response into the newest commit, if any.
pub fn parse_commit_list(json: &str) -> Result<Option<CommitInfo>, String> {
    let commits: Vec<CommitEnvelope> =
        serde_json::from_str(json).map_err(|e| format!("unexpected commits response: {}", e))?;
    Ok(commits.into_iter().next().map(|c| {
        let (author, date) = c
            .commit
            .author
            .map(|a| (a.name, a.date))
            .unwrap_or_default();
        CommitInfo {
            sha: c.sha,
            message: c.commit.message.lines().next().unwrap_or_default().to_string(),
            author,
            date,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_JSON: &str = r#"[
        {"name": "qsmxt", "path": "recipes/qsmxt", "sha": "abc123", "type": "dir"},
        {"name": "fmriprep", "path": "recipes/fmriprep", "sha": "def456", "type": "dir"},
        {"name": "README.md", "path": "recipes/README.md", "sha": "777", "type": "file"}
    ]"#;

    const COMMITS_JSON: &str = r#"[
        {
            "sha": "deadbeef",
            "commit": {
                "message": "Update qsmxt to 8.0.3\n\nLonger body here.",
                "author": {"name": "Ada", "date": "2026-05-01T10:00:00Z"}
            }
        }
    ]"#;

    #[test]
    fn test_nf012_parse_listing_keeps_dirs_only() {
        let listings = parse_content_listing(LISTING_JSON).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name, "qsmxt");
        assert_eq!(listings[0].path, "recipes/qsmxt");
        assert_eq!(listings[1].name, "fmriprep");
        assert!(listings[0].commit.is_none());
    }

    #[test]
    fn test_nf012_parse_listing_bad_json() {
        assert!(parse_content_listing("{not json").is_err());
        assert!(parse_content_listing("{\"message\": \"Not Found\"}").is_err());
    }

    #[test]
    fn test_nf012_parse_commit_first_line_only() {
        let commit = parse_commit_list(COMMITS_JSON).unwrap().unwrap();
        assert_eq!(commit.sha, "deadbeef");
        assert_eq!(commit.message, "Update qsmxt to 8.0.3");
        assert_eq!(commit.author, "Ada");
        assert_eq!(commit.date, "2026-05-01T10:00:00Z");
    }

    #[test]
    fn test_nf012_parse_commit_empty_list() {
        assert_eq!(parse_commit_list("[]").unwrap(), None);
    }

    #[test]
    fn test_nf012_parse_commit_missing_author() {
        let json = r#"[{"sha": "x", "commit": {"message": "m", "author": null}}]"#;
        let commit = parse_commit_list(json).unwrap().unwrap();
        assert_eq!(commit.author, "");
        assert_eq!(commit.date, "");
    }

    #[test]
    fn test_nf012_recipe_url() {
        let client = GitHubClient::new(DEFAULT_OWNER, DEFAULT_REPO, DEFAULT_BRANCH).unwrap();
        assert_eq!(
            client.recipe_url("qsmxt"),
            "https://raw.githubusercontent.com/neurodesk/neurocontainers/main/recipes/qsmxt/build.yaml"
        );
    }

    #[test]
    fn test_nf012_with_endpoints_trims_slash() {
        let client = GitHubClient::new("o", "r", "b")
            .unwrap()
            .with_endpoints("http://localhost:9999/api/", "http://localhost:9999/raw/");
        assert_eq!(client.recipe_url("x"), "http://localhost:9999/raw/o/r/b/recipes/x/build.yaml");
    }

    #[test]
    fn test_nf012_listing_roundtrips_through_serde() {
        let listings = parse_content_listing(LISTING_JSON).unwrap();
        let json = serde_json::to_string(&listings).unwrap();
        let again: Vec<RecipeListing> = serde_json::from_str(&json).unwrap();
        assert_eq!(listings, again);
    }
}
