//! # snippet-search
//!
//! A Rust web application that answers a natural-language query with the
//! single most relevant code snippet from a source corpus, then grades
//! that snippet against a configurable set of coding standards.
//!
//! ## Architecture
//!
//! Two retrieval strategies feed the same evaluator:
//!
//! ```text
//!                         ┌─────────────┐
//!                         │  User Query  │
//!                         └──────┬───────┘
//!                 live           │           indexed
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!   ┌────────────────┐                     ┌──────────────────┐
//!   │ Keyword Extract│                     │  Fuzzy Boosted   │
//!   │ (vocabulary ∩  │                     │  tantivy Query   │
//!   │  noun tokens)  │                     │  tags > desc >   │
//!   └───────┬────────┘                     │  snippet         │
//!           │ keyword                      └────────┬─────────┘
//!           ▼                                       │
//!   ┌────────────────┐                              │
//!   │ Fetch & Carve  │                              │
//!   │ bounded pool   │                              │
//!   │ (10 in flight) │                              │
//!   └───────┬────────┘                              │
//!           │ candidate snippets                    │
//!           ▼                                       │
//!   ┌────────────────┐                              │
//!   │ Embedding Rank │                              │
//!   │ cosine argmax  │                              │
//!   └───────┬────────┘                              │
//!           │ top candidate                         │ top document
//!           └──────────────────┬────────────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ Code Standards Evaluator│
//!                 │ 5 rule groups, pure     │
//!                 └────────────┬────────────┘
//!                              ▼
//!             { snippet, score, alignment, suggestions }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, data dirs,
//!   the source host, and the embedding provider
//! - [`models`] - Shared data types: `CandidateSnippet`, request/response types
//! - [`keyword`] - Vocabulary-driven keyword extraction from free-text queries
//! - [`extract`] - tree-sitter snippet extraction (one candidate per
//!   function/class definition)
//! - [`host`] - Source host REST client: list repos, list files, fetch raw text
//! - [`corpus`] - Live corpus assembly: keyword carving under a bounded fetch pool
//! - [`embedding`] - Batch embedding generation via Ollama or OpenAI-compatible
//!   APIs, cosine-similarity ranking
//! - [`index`] - Snippet index powered by tantivy with per-field fuzzy boosts
//! - [`evaluate`] - Deterministic code-standards evaluator
//! - [`walk`] - Local source tree walking for the offline extraction pipeline
//! - [`api`] - Axum HTTP handlers for search, indexing, and config management
//! - [`state`] - Shared application state holding the index, vocabulary,
//!   standards, and provider config

pub mod api;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod evaluate;
pub mod extract;
pub mod host;
pub mod index;
pub mod keyword;
pub mod models;
pub mod state;
pub mod walk;
