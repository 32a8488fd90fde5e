//! Snippet index: tantivy-backed lexical retrieval with per-field fuzzy
//! matching and boosted weights.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query};
use tantivy::schema::*;
use tantivy::{doc, Index, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use uuid::Uuid;

use crate::models::CandidateSnippet;

/// Field boosts mirroring the ranking weights: identifier tags dominate,
/// then the generated description, then the raw snippet text.
const TAGS_BOOST: f32 = 5.0;
const DESCRIPTION_BOOST: f32 = 3.0;
const SNIPPET_BOOST: f32 = 2.0;

pub struct SnippetIndex {
    index: Index,
    #[allow(dead_code)]
    schema: Schema,
    // Field handles
    f_id: Field,
    f_snippet: Field,
    f_tags: Field,
    f_description: Field,
    f_file_path: Field,
}

/// The single best document for a query.
#[derive(Debug, Clone)]
pub struct IndexedHit {
    pub snippet: String,
    pub tags: Vec<String>,
    pub description: String,
    pub file_path: String,
    /// Raw relevance normalized against the best score observed for
    /// this query, scaled into [0, 100].
    pub score: f32,
}

impl SnippetIndex {
    /// Create or open a snippet index at the given directory.
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let mut schema_builder = Schema::builder();
        let f_id = schema_builder.add_text_field("id", STRING | STORED);
        let f_snippet = schema_builder.add_text_field("snippet", TEXT | STORED);
        let f_tags = schema_builder.add_text_field("tags", TEXT | STORED);
        let f_description = schema_builder.add_text_field("description", TEXT | STORED);
        let f_file_path = schema_builder.add_text_field("file_path", TEXT | STORED);

        let schema = schema_builder.build();

        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(index_dir).context("Failed to open existing tantivy index")?
        } else {
            Index::create_in_dir(index_dir, schema.clone())
                .context("Failed to create tantivy index")?
        };

        Ok(Self {
            index,
            schema,
            f_id,
            f_snippet,
            f_tags,
            f_description,
            f_file_path,
        })
    }

    /// Upsert a batch of extracted snippets.
    ///
    /// Document identity is a UUIDv5 of file path, identifier, and
    /// per-file ordinal, so re-running extraction over the same tree
    /// replaces documents instead of duplicating them.
    pub fn upsert_snippets(&self, snippets: &[CandidateSnippet]) -> Result<usize> {
        let mut writer: IndexWriter = self
            .index
            .writer(50_000_000)
            .context("Failed to create index writer")?;

        let mut ordinals: HashMap<(String, String), usize> = HashMap::new();

        for snippet in snippets {
            let identifier = snippet
                .tags
                .first()
                .map(String::as_str)
                .unwrap_or_default()
                .to_string();
            let ordinal = ordinals
                .entry((snippet.file_path.clone(), identifier.clone()))
                .or_insert(0);
            let id = Uuid::new_v5(
                &Uuid::NAMESPACE_OID,
                format!("{}:{identifier}:{ordinal}", snippet.file_path).as_bytes(),
            );
            *ordinal += 1;

            writer.delete_term(Term::from_field_text(self.f_id, &id.to_string()));
            writer.add_document(doc!(
                self.f_id => id.to_string(),
                self.f_snippet => snippet.text.clone(),
                self.f_tags => snippet.tags.join(" "),
                self.f_description => snippet.description.clone(),
                self.f_file_path => snippet.file_path.clone(),
            ))?;
        }

        writer.commit().context("Failed to commit snippet batch")?;
        Ok(snippets.len())
    }

    /// Number of documents currently in the index.
    pub fn doc_count(&self) -> Result<usize> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("Failed to create reader")?;
        Ok(reader.searcher().num_docs() as usize)
    }

    /// Run the compound fuzzy query and return the single best document,
    /// or None when nothing matches.
    ///
    /// Each lower-cased query token contributes one fuzzy clause per
    /// field; at least one clause must match. The returned score is
    /// normalized against the maximum score observed among this query's
    /// matches, so the top document always reads 100 (or 0 when the
    /// engine reports a zero ceiling).
    pub fn search(&self, query_str: &str) -> Result<Option<IndexedHit>> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("Failed to create reader")?;

        let searcher = reader.searcher();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in query_str
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            for (field, boost) in [
                (self.f_tags, TAGS_BOOST),
                (self.f_description, DESCRIPTION_BOOST),
                (self.f_snippet, SNIPPET_BOOST),
            ] {
                let term = Term::from_field_text(field, token);
                let fuzzy = FuzzyTermQuery::new(term, fuzzy_distance(token), true);
                let boosted = BoostQuery::new(Box::new(fuzzy), boost);
                clauses.push((Occur::Should, Box::new(boosted) as Box<dyn Query>));
            }
        }

        if clauses.is_empty() {
            return Ok(None);
        }

        let query = BooleanQuery::new(clauses);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(10))
            .context("Snippet search failed")?;

        let max_score = top_docs.first().map(|(score, _)| *score).unwrap_or(0.0);
        let Some((raw_score, doc_address)) = top_docs.into_iter().next() else {
            return Ok(None);
        };

        let score = if max_score > 0.0 {
            (raw_score / max_score) * 100.0
        } else {
            0.0
        };

        let doc: TantivyDocument = searcher
            .doc(doc_address)
            .context("Failed to retrieve document")?;

        let get_text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let tags: Vec<String> = get_text(self.f_tags)
            .split_whitespace()
            .map(String::from)
            .collect();

        Ok(Some(IndexedHit {
            snippet: get_text(self.f_snippet),
            tags,
            description: get_text(self.f_description),
            file_path: get_text(self.f_file_path),
            score,
        }))
    }
}

/// Edit-distance budget by token length: short tokens must match
/// exactly, medium tokens tolerate one edit, long tokens two.
fn fuzzy_distance(token: &str) -> u8 {
    match token.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snippets() -> Vec<CandidateSnippet> {
        vec![
            CandidateSnippet {
                text: "def process_video(path):\n    # decode frames\n    return path".to_string(),
                file_path: "/video/processor.py".to_string(),
                tags: vec!["process_video".to_string()],
                description: "A function that defines process_video".to_string(),
            },
            CandidateSnippet {
                text: "class Parser:\n    def parse(self):\n        pass".to_string(),
                file_path: "/lang/parser.py".to_string(),
                tags: vec!["parser".to_string()],
                description: "A class that defines Parser".to_string(),
            },
            CandidateSnippet {
                text: "def load_config(path):\n    return json.load(open(path))".to_string(),
                file_path: "/core/config.py".to_string(),
                tags: vec!["load_config".to_string()],
                description: "A function that defines load_config".to_string(),
            },
        ]
    }

    #[test]
    fn test_upsert_and_search_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        index.upsert_snippets(&sample_snippets()).unwrap();

        let hit = index.search("parser").unwrap().unwrap();
        assert_eq!(hit.file_path, "/lang/parser.py");
        assert_eq!(hit.tags, vec!["parser"]);
        assert!(hit.snippet.contains("class Parser"));
    }

    #[test]
    fn test_top_hit_scores_one_hundred() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        index.upsert_snippets(&sample_snippets()).unwrap();

        let hit = index.search("parser").unwrap().unwrap();
        assert!((hit.score - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_match_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        index.upsert_snippets(&sample_snippets()).unwrap();

        assert!(index.search("spaceship").unwrap().is_none());
    }

    #[test]
    fn test_empty_query_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        index.upsert_snippets(&sample_snippets()).unwrap();

        assert!(index.search("").unwrap().is_none());
        assert!(index.search("  ,;  ").unwrap().is_none());
    }

    #[test]
    fn test_fuzzy_match_tolerates_a_typo() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        index.upsert_snippets(&sample_snippets()).unwrap();

        // One edit away from "parser".
        let hit = index.search("parsers").unwrap().unwrap();
        assert_eq!(hit.file_path, "/lang/parser.py");
    }

    #[test]
    fn test_tag_match_outranks_snippet_mention() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();
        let snippets = vec![
            CandidateSnippet {
                text: "def unrelated():\n    # touches encoder internals\n    encoder = None"
                    .to_string(),
                file_path: "/a.py".to_string(),
                tags: vec!["unrelated".to_string()],
                description: "A function that defines unrelated".to_string(),
            },
            CandidateSnippet {
                text: "def run():\n    pass".to_string(),
                file_path: "/b.py".to_string(),
                tags: vec!["encoder".to_string()],
                description: "A class that defines Encoder".to_string(),
            },
        ];
        index.upsert_snippets(&snippets).unwrap();

        let hit = index.search("encoder").unwrap().unwrap();
        assert_eq!(hit.file_path, "/b.py");
    }

    #[test]
    fn test_reindexing_same_tree_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();

        index.upsert_snippets(&sample_snippets()).unwrap();
        let first_count = index.doc_count().unwrap();

        index.upsert_snippets(&sample_snippets()).unwrap();
        let second_count = index.doc_count().unwrap();

        assert_eq!(first_count, 3);
        assert_eq!(second_count, first_count);
    }

    #[test]
    fn test_duplicate_identifiers_in_one_file_both_kept() {
        let dir = tempfile::tempdir().unwrap();
        let index = SnippetIndex::open_or_create(dir.path()).unwrap();

        // Two constructs sharing an identifier in the same file get
        // distinct ordinals, hence distinct documents.
        let snippets = vec![
            CandidateSnippet {
                text: "def setup(): pass".to_string(),
                file_path: "/dup.py".to_string(),
                tags: vec!["setup".to_string()],
                description: "A function that defines setup".to_string(),
            },
            CandidateSnippet {
                text: "class setup:\n    pass".to_string(),
                file_path: "/dup.py".to_string(),
                tags: vec!["setup".to_string()],
                description: "A class that defines setup".to_string(),
            },
        ];
        index.upsert_snippets(&snippets).unwrap();
        assert_eq!(index.doc_count().unwrap(), 2);
    }

    #[test]
    fn test_fuzzy_distance_scales_with_token_length() {
        assert_eq!(fuzzy_distance("io"), 0);
        assert_eq!(fuzzy_distance("parse"), 1);
        assert_eq!(fuzzy_distance("processor"), 2);
    }
}
