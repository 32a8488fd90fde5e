use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{RetrievalStrategy, SearchOutcome, SearchRequest, SearchResult};
use crate::state::AppState;

/// POST /api/search - resolve a query to its single most relevant
/// snippet, then grade that snippet against the code standards:
///   live:    keyword -> bounded fetch-and-carve -> embedding argmax
///   indexed: fuzzy boosted tantivy query
///
/// A missing query is the only client error; every other failure comes
/// back as a well-formed `{error}` body.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    let outcome = match req.strategy {
        RetrievalStrategy::Live => search_live(&state, &query).await,
        RetrievalStrategy::Indexed => search_indexed(&state, &query).await,
    };

    let outcome = outcome.unwrap_or_else(|e| {
        tracing::error!("Search failed: {e:#}");
        SearchOutcome::Error {
            error: format!("{e:#}"),
        }
    });

    Ok(Json(outcome))
}

/// Live path: crawl the source host, carve around the extracted
/// keyword, pick the embedding-similarity winner.
async fn search_live(state: &AppState, query: &str) -> anyhow::Result<SearchOutcome> {
    let Some(keyword) = crate::keyword::extract_keyword(query, &state.vocabulary) else {
        return Ok(SearchOutcome::Error {
            error: "No relevant keyword found.".to_string(),
        });
    };
    tracing::info!("Query keyword: {keyword}");

    let corpus = crate::corpus::build_live_corpus(
        state.host.clone(),
        &state.config.excluded_extensions,
        &keyword,
        state.config.max_concurrent_fetches,
    )
    .await?;

    if corpus.is_empty() {
        return Ok(SearchOutcome::Error {
            error: "No relevant code snippets found.".to_string(),
        });
    }
    tracing::info!("Ranking {} carved candidates", corpus.len());

    let texts: Vec<String> = corpus.iter().map(|c| c.text.clone()).collect();
    let llm_config = state.llm_config.read().clone();
    let ranked =
        crate::embedding::most_relevant(&state.http_client, &llm_config, query, &texts).await?;

    let Some((best, score)) = ranked else {
        return Ok(SearchOutcome::Error {
            error: "No relevant code snippets found.".to_string(),
        });
    };

    let winner = &corpus[best];
    let evaluation = crate::evaluate::evaluate(&winner.text, &state.standards);

    Ok(SearchOutcome::Found(SearchResult {
        most_relevant_code: winner.text.clone(),
        similarity_score: score,
        file_link: state.host.file_link(&winner.repo_id, &winner.file_path),
        alignment_percentage: evaluation.alignment_percentage,
        suggestions: evaluation.suggestions,
    }))
}

/// Indexed path: single fuzzy boosted query against the snippet index.
async fn search_indexed(state: &AppState, query: &str) -> anyhow::Result<SearchOutcome> {
    let index = state.index.clone();
    let q = query.to_string();
    let hit = tokio::task::spawn_blocking(move || index.search(&q)).await??;

    let Some(hit) = hit else {
        return Ok(SearchOutcome::Error {
            error: "No snippets found.".to_string(),
        });
    };

    let evaluation = crate::evaluate::evaluate(&hit.snippet, &state.standards);

    Ok(SearchOutcome::Found(SearchResult {
        most_relevant_code: hit.snippet,
        similarity_score: hit.score,
        file_link: hit.file_path,
        alignment_percentage: evaluation.alignment_percentage,
        suggestions: evaluation.suggestions,
    }))
}
