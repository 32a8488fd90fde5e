use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A unit of code text considered for relevance ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnippet {
    /// Exact source text spanning the construct
    pub text: String,
    /// Provenance: path of the file the snippet came from
    pub file_path: String,
    /// Lower-cased identifiers derived from the construct name
    pub tags: Vec<String>,
    /// Templated sentence naming the construct and its identifier
    pub description: String,
}

/// Which retrieval strategy serves the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Crawl the source host, carve around the query keyword, rank by
    /// embedding similarity
    #[default]
    Live,
    /// Query the pre-built snippet index, rank by fuzzy lexical relevance
    Indexed,
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub strategy: RetrievalStrategy,
}

/// Success body for POST /api/search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub most_relevant_code: String,
    /// Relevance in [0, 100]; 100 is the perfect or maximum-observed
    /// match within this query's candidate set. Not comparable across
    /// queries.
    pub similarity_score: f32,
    pub file_link: String,
    pub alignment_percentage: f64,
    pub suggestions: BTreeSet<String>,
}

/// Every search produces a well-formed body: either the result or a
/// described error. Exhaustion (no keyword, empty corpus, no index
/// match) is an error body, never a crash.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Found(SearchResult),
    Error { error: String },
}

/// Indexing request: pull supported files from the source host by
/// default, or walk a local directory tree instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexRequest {
    pub dir: Option<String>,
}

/// Summary returned by POST /api/index
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub files_seen: usize,
    pub files_skipped: usize,
    pub snippets_indexed: usize,
    pub indexed_at: chrono::DateTime<chrono::Utc>,
}

/// Embedding provider config update request
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    pub provider: Option<String>,
    // base_url intentionally omitted: immutable at runtime to prevent SSRF
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub embedding_dim: Option<usize>,
}
