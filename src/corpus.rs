//! Live corpus assembly: carve candidate snippets out of remote files
//! around a query keyword, fanning the fetches out under a bounded
//! worker pool.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::host::SourceHost;

/// A file scheduled for fetch-and-carve.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub repo_id: String,
    pub path: String,
}

/// A successfully carved snippet with its provenance.
#[derive(Debug, Clone)]
pub struct CarvedSnippet {
    pub repo_id: String,
    pub file_path: String,
    pub text: String,
}

/// True when the path's extension marks a binary/media/model artifact
/// that should never be fetched. The list is configuration, not logic.
pub fn is_excluded(path: &str, excluded_extensions: &[String]) -> bool {
    excluded_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

/// Carve the portion of `content` around the first case-insensitive
/// occurrence of `keyword`: from that occurrence to the start of the
/// next `class ` definition after it, or to end of file.
///
/// A structural heuristic, not an AST boundary: it assumes the keyword
/// sits inside or near the construct of interest and that class heads
/// approximate construct boundaries. It will over- or under-capture
/// when those assumptions fail.
pub fn carve_snippet(content: &str, keyword: &str) -> Option<String> {
    if keyword.is_empty() {
        return None;
    }

    // ASCII lowering keeps byte offsets stable between the haystack and
    // the original content.
    let haystack = content.to_ascii_lowercase();
    let needle = keyword.to_ascii_lowercase();
    let start = haystack.find(&needle)?;

    // Look for the next class head strictly after the match start.
    let mut from = start + 1;
    while from < content.len() && !content.is_char_boundary(from) {
        from += 1;
    }
    let end = match content.get(from..).and_then(|rest| rest.find("class ")) {
        Some(i) => from + i,
        None => content.len(),
    };

    Some(content[start..end].to_string())
}

/// Fetch every file and carve it around the keyword, with at most
/// `max_in_flight` fetches running at a time.
///
/// Results are collected in completion order, which carries no meaning:
/// downstream only needs every non-empty carve exactly once. A failed
/// fetch or a keyword miss in one file is logged and dropped without
/// cancelling or blocking the rest of the batch; only the caller can
/// decide that a fully empty corpus is an error.
pub async fn collect_carved<F, Fut>(
    files: Vec<RemoteFile>,
    keyword: &str,
    max_in_flight: usize,
    fetch: F,
) -> Vec<CarvedSnippet>
where
    F: Fn(RemoteFile) -> Fut,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks: JoinSet<(RemoteFile, anyhow::Result<String>)> = JoinSet::new();

    for file in files {
        let semaphore = semaphore.clone();
        let fut = fetch(file.clone());
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (file, Err(anyhow::anyhow!("Fetch pool closed"))),
            };
            (file, fut.await)
        });
    }

    let mut carved = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((file, Ok(content))) => {
                if let Some(text) = carve_snippet(&content, keyword) {
                    carved.push(CarvedSnippet {
                        repo_id: file.repo_id,
                        file_path: file.path,
                        text,
                    });
                }
            }
            Ok((file, Err(e))) => {
                tracing::warn!("Skipping {}: {e:#}", file.path);
            }
            Err(e) => {
                tracing::warn!("Fetch task failed: {e}");
            }
        }
    }

    carved
}

/// Build the live corpus: every repository's files minus the excluded
/// extensions, fetched and carved around the keyword under the
/// concurrency ceiling.
pub async fn build_live_corpus(
    host: Arc<SourceHost>,
    excluded_extensions: &[String],
    keyword: &str,
    max_in_flight: usize,
) -> anyhow::Result<Vec<CarvedSnippet>> {
    let repos = host.list_repositories().await?;

    let mut files = Vec::new();
    for repo in &repos {
        match host.list_file_paths(&repo.id).await {
            Ok(paths) => {
                for path in paths {
                    if !is_excluded(&path, excluded_extensions) {
                        files.push(RemoteFile {
                            repo_id: repo.id.clone(),
                            path,
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping repository {}: {e:#}", repo.name);
            }
        }
    }

    tracing::info!(
        "Fetching {} candidate files across {} repositories",
        files.len(),
        repos.len()
    );

    let fetch_host = host.clone();
    let carved = collect_carved(files, keyword, max_in_flight, move |file| {
        let host = fetch_host.clone();
        async move { host.fetch_raw(&file.repo_id, &file.path).await }
    })
    .await;

    Ok(carved)
}
