use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use std::path::PathBuf;

use crate::corpus::RemoteFile;
use crate::models::{CandidateSnippet, IndexRequest, IndexSummary};
use crate::state::{AppState, IndexMeta};

/// POST /api/index - run the extraction pipeline and upsert the results
/// into the snippet index. Pulls supported files from the source host,
/// or walks a local directory when `dir` is given.
pub async fn run_index(
    State(state): State<AppState>,
    Json(req): Json<IndexRequest>,
) -> Result<Json<IndexSummary>, (StatusCode, String)> {
    let outcome = match req.dir {
        Some(dir) => index_local_dir(&state, dir).await,
        None => index_from_host(&state).await,
    };

    match outcome {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::error!("Indexing failed: {e:#}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}

/// GET /api/status - index size and last index run.
pub async fn status(State(state): State<AppState>) -> Json<IndexMeta> {
    Json(state.index_meta.read().clone())
}

/// Walk a local tree and extract snippets from every supported file.
async fn index_local_dir(state: &AppState, dir: String) -> anyhow::Result<IndexSummary> {
    let root = PathBuf::from(dir);
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let files = tokio::task::spawn_blocking(move || crate::walk::walk_source_files(&root)).await?;
    tracing::info!("Extracting snippets from {} files", files.len());

    let mut snippets = Vec::new();
    let mut files_skipped = 0usize;
    for file in &files {
        match crate::extract::extract_snippets(&file.content, &file.relative_path) {
            Ok(found) => snippets.extend(found),
            Err(e) => {
                files_skipped += 1;
                tracing::warn!("Skipping {}: {e:#}", file.relative_path);
            }
        }
    }

    upsert_and_summarize(state, files.len(), files_skipped, snippets).await
}

/// Pull supported files from the source host and extract snippets.
/// Per-file fetch or parse failures are skipped; only host-level
/// listing failures abort the run.
async fn index_from_host(state: &AppState) -> anyhow::Result<IndexSummary> {
    let repos = state.host.list_repositories().await?;

    let mut files = Vec::new();
    for repo in &repos {
        match state.host.list_file_paths(&repo.id).await {
            Ok(paths) => {
                files.extend(
                    paths
                        .into_iter()
                        .filter(|p| crate::extract::is_supported(p))
                        .map(|path| RemoteFile {
                            repo_id: repo.id.clone(),
                            path,
                        }),
                );
            }
            Err(e) => {
                tracing::warn!("Skipping repository {}: {e:#}", repo.name);
            }
        }
    }
    tracing::info!(
        "Extracting snippets from {} files across {} repositories",
        files.len(),
        repos.len()
    );

    let mut snippets = Vec::new();
    let mut files_skipped = 0usize;
    for file in &files {
        let content = match state.host.fetch_raw(&file.repo_id, &file.path).await {
            Ok(content) => content,
            Err(e) => {
                files_skipped += 1;
                tracing::warn!("Skipping {}: {e:#}", file.path);
                continue;
            }
        };
        match crate::extract::extract_snippets(&content, &file.path) {
            Ok(found) => snippets.extend(found),
            Err(e) => {
                files_skipped += 1;
                tracing::warn!("Skipping {}: {e:#}", file.path);
            }
        }
    }

    upsert_and_summarize(state, files.len(), files_skipped, snippets).await
}

async fn upsert_and_summarize(
    state: &AppState,
    files_seen: usize,
    files_skipped: usize,
    snippets: Vec<CandidateSnippet>,
) -> anyhow::Result<IndexSummary> {
    let snippets_indexed = snippets.len();

    let index = state.index.clone();
    tokio::task::spawn_blocking(move || index.upsert_snippets(&snippets)).await??;

    let count_index = state.index.clone();
    let documents = tokio::task::spawn_blocking(move || count_index.doc_count()).await??;

    let indexed_at = Utc::now();
    {
        let mut meta = state.index_meta.write();
        meta.documents = documents;
        meta.last_indexed_at = Some(indexed_at);
    }
    state.persist_index_meta();

    tracing::info!("Indexed {snippets_indexed} snippets from {files_seen} files");

    Ok(IndexSummary {
        files_seen,
        files_skipped,
        snippets_indexed,
        indexed_at,
    })
}
