//! # Ocean - Retrieval-augmented banking assistant
//!
//! Answers customer questions for a bank by classifying the question's intent,
//! retrieving relevant knowledge-base documents, and asking a generation
//! backend for an answer shaped by intent-specific instructions. Answers come
//! back whole or as a stream of fragments; without a configured backend the
//! assistant runs in mock mode with a fixed greeting.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ocean::db::InMemoryVectorStore;
//! use ocean::rag::{seed, DocumentIndex, RagService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ocean::Result<()> {
//!     let config = ocean::utils::load_config()?;
//!     ocean::utils::telemetry::init_tracing(&config.logging)?;
//!
//!     let store = Arc::new(InMemoryVectorStore::new());
//!     let index = DocumentIndex::from_config(&config.rag, store).await?;
//!     seed::seed_sample_documents(&index).await?;
//!
//!     let service = RagService::from_config(&config, Arc::new(index)).await?;
//!     println!("{}", service.get_answer("What's my account balance?").await);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Local Ollama generation backend (default) |
//! | `local-embeddings` | `all-MiniLM-L6-v2` embeddings via fastembed |
//!
//! ## Modules
//!
//! - [`intents`] - Keyword intent classification
//! - [`rag`] - Retrieval, prompt assembly, normalization and orchestration
//! - [`llm`] - Generation backends and the mock-aware adapter
//! - [`db`] - Vector stores
//! - [`api`] - Request validation and SSE framing
//! - [`types`] - Shared types and errors
//! - [`utils`] - Configuration and logging

pub mod api;
pub mod db;
pub mod intents;
pub mod llm;
pub mod rag;
pub mod types;
pub mod utils;

pub use intents::{IntentDefinition, IntentTable};
pub use llm::{GenerationAdapter, LLMClient, Provider};
pub use rag::{Fragment, RagService};
pub use types::{AppError, Result};
pub use utils::OceanConfig;
