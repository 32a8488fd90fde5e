use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the snippet index and its metadata are stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Embedding provider configuration
    pub llm: LlmConfig,
    /// Source host the live retrieval path crawls
    pub host: SourceHostConfig,
    /// Code standards file (JSON, five fields); missing or malformed is
    /// a fatal startup error
    pub standards_path: PathBuf,
    /// Vocabulary file (flat JSON array of programming terms); missing
    /// is fatal for the live path's keyword step
    pub vocabulary_path: PathBuf,
    /// Concurrency ceiling for the live fetch-and-carve pool
    pub max_concurrent_fetches: usize,
    /// Per-request timeout for outbound HTTP in seconds
    pub fetch_timeout_secs: u64,
    /// File extensions never fetched from the source host
    /// (binary/media/model artifacts)
    pub excluded_extensions: Vec<String>,
}

/// Source host coordinates. The host must expose three operations: list
/// repositories, list all file paths in a repository, fetch raw text
/// content of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHostConfig {
    /// Base URL, e.g. "https://dev.azure.com"
    pub base_url: String,
    /// Organization segment of the host URL
    pub organization: String,
    /// Project segment of the host URL
    pub project: String,
    /// Personal access token for private repositories
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API
    pub base_url: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9100".to_string(),
            llm: LlmConfig::default(),
            host: SourceHostConfig::default(),
            standards_path: PathBuf::from("./code_standards.json"),
            vocabulary_path: PathBuf::from("./programming_keywords.json"),
            max_concurrent_fetches: 10,
            fetch_timeout_secs: 120,
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

impl Default for SourceHostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.azure.com".to_string(),
            organization: String::new(),
            project: String::new(),
            token: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            embedding_dim: 768,
        }
    }
}

fn default_excluded_extensions() -> Vec<String> {
    [
        ".mp4", ".json", ".avi", ".mkv", ".wav", ".mp3", ".jpg", ".jpeg", ".png", ".pkl",
        ".h5", ".pt", ".unet",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("SNIPPET_SEARCH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("SNIPPET_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("SNIPPET_SEARCH_STANDARDS_PATH") {
            config.standards_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("SNIPPET_SEARCH_VOCABULARY_PATH") {
            config.vocabulary_path = PathBuf::from(path);
        }
        if let Ok(val) = std::env::var("SNIPPET_SEARCH_MAX_CONCURRENT_FETCHES") {
            if let Ok(v) = val.parse() {
                config.max_concurrent_fetches = v;
            }
        }
        if let Ok(val) = std::env::var("SNIPPET_SEARCH_FETCH_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.fetch_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("SNIPPET_SEARCH_EXCLUDED_EXTENSIONS") {
            config.excluded_extensions = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(url) = std::env::var("SOURCE_HOST_BASE_URL") {
            config.host.base_url = url;
        }
        if let Ok(org) = std::env::var("SOURCE_HOST_ORGANIZATION") {
            config.host.organization = org;
        }
        if let Ok(project) = std::env::var("SOURCE_HOST_PROJECT") {
            config.host.project = project;
        }
        if let Ok(token) = std::env::var("SOURCE_HOST_TOKEN") {
            config.host.token = Some(token);
        }

        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        config
    }

    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join("index_meta.json")
    }
}
