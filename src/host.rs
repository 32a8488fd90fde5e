//! Source host client: the three operations the live retrieval path
//! needs from the remote git host (an Azure DevOps-shaped REST API) —
//! list repositories, list all file paths in a repository, fetch the
//! raw text content of one file.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::SourceHostConfig;

pub struct SourceHost {
    client: reqwest::Client,
    config: SourceHostConfig,
}

/// A repository visible on the source host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostRepo {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct ValueList<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct HostItem {
    path: String,
    #[serde(default, rename = "isFolder")]
    is_folder: bool,
}

impl SourceHost {
    pub fn new(client: reqwest::Client, config: SourceHostConfig) -> Self {
        Self { client, config }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(url).header("Accept", "application/json");
        match &self.config.token {
            // PAT auth: empty user, token as password
            Some(token) => req.basic_auth("", Some(token)),
            None => req,
        }
    }

    fn api_root(&self) -> String {
        format!(
            "{}/{}/{}/_apis/git/repositories",
            self.config.base_url, self.config.organization, self.config.project
        )
    }

    /// List repositories in the configured project.
    pub async fn list_repositories(&self) -> Result<Vec<HostRepo>> {
        let url = format!("{}?api-version=7.0", self.api_root());

        let resp = self
            .get(&url)
            .send()
            .await
            .context("Failed to list repositories")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Repository listing returned {status}");
        }

        let body: ValueList<HostRepo> = resp
            .json()
            .await
            .context("Failed to parse repository list")?;
        Ok(body.value)
    }

    /// List every file path in a repository, recursively. Folders are
    /// filtered out.
    pub async fn list_file_paths(&self, repo_id: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/{repo_id}/items?recursionLevel=Full&api-version=7.0",
            self.api_root()
        );

        let resp = self
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to list items for repository {repo_id}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Item listing for repository {repo_id} returned {status}");
        }

        let body: ValueList<HostItem> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse item list for repository {repo_id}"))?;

        Ok(body
            .value
            .into_iter()
            .filter(|item| !item.is_folder)
            .map(|item| item.path)
            .collect())
    }

    /// Fetch the raw text content of one file.
    pub async fn fetch_raw(&self, repo_id: &str, path: &str) -> Result<String> {
        let url = format!(
            "{}/{repo_id}/items?path={path}&api-version=7.0&$format=text",
            self.api_root()
        );

        let resp = self
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Fetch of {path} returned {status}");
        }

        resp.text()
            .await
            .with_context(|| format!("Failed to read body of {path}"))
    }

    /// Browser link to a file, for the search response.
    pub fn file_link(&self, repo_id: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/_git/{repo_id}?path={path}",
            self.config.base_url, self.config.organization, self.config.project
        )
    }
}
