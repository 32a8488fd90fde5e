use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, LlmConfig};
use crate::evaluate::StandardsConfig;
use crate::host::SourceHost;
use crate::index::SnippetIndex;
use crate::keyword::Vocabulary;

/// Counters describing the last completed index run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub documents: usize,
    pub last_indexed_at: Option<DateTime<Utc>>,
}

/// Shared application state. The vocabulary, standards, and index
/// handles are constructed once at startup, shared read-only, and torn
/// down at process exit — never reloaded mid-run.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub vocabulary: Arc<Vocabulary>,
    pub standards: Arc<StandardsConfig>,
    pub index: Arc<SnippetIndex>,
    pub host: Arc<SourceHost>,
    pub llm_config: Arc<RwLock<LlmConfig>>,
    pub index_meta: Arc<RwLock<IndexMeta>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Ensure data directories exist
        std::fs::create_dir_all(config.index_dir())?;

        // Both files are required: no degraded mode without them.
        let vocabulary = Vocabulary::load(&config.vocabulary_path)?;
        let standards = StandardsConfig::load(&config.standards_path)?;
        tracing::info!("Loaded {} vocabulary terms", vocabulary.len());

        let index = SnippetIndex::open_or_create(&config.index_dir())?;

        let index_meta = if config.meta_path().exists() {
            let data = std::fs::read_to_string(config.meta_path())?;
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            IndexMeta::default()
        };

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        let host = SourceHost::new(http_client.clone(), config.host.clone());
        let llm_config = config.llm.clone();

        Ok(Self {
            config,
            http_client,
            vocabulary: Arc::new(vocabulary),
            standards: Arc::new(standards),
            index: Arc::new(index),
            host: Arc::new(host),
            llm_config: Arc::new(RwLock::new(llm_config)),
            index_meta: Arc::new(RwLock::new(index_meta)),
        })
    }

    /// Persist index metadata to disk (atomic write via temp file + rename).
    pub fn persist_index_meta(&self) {
        let meta = self.index_meta.read();
        if let Ok(data) = serde_json::to_string_pretty(&*meta) {
            let meta_path = self.config.meta_path();
            let tmp_path = meta_path.with_extension("json.tmp");
            if std::fs::write(&tmp_path, &data).is_ok() {
                let _ = std::fs::rename(&tmp_path, &meta_path);
            }
        }
    }
}
