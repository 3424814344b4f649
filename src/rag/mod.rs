//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! Answers a customer question in four stages:
//!
//! 1. **Retrieval** - the question is embedded and the nearest knowledge-base
//!    documents are fetched ([`retriever`], [`index`], [`embeddings`])
//! 2. **Prompt assembly** - the question's intent selects an instruction block,
//!    combined with the context and the question ([`prompt`])
//! 3. **Generation** - whole or streamed, through [`crate::llm`]
//! 4. **Normalization** - spacing repairs on the generated text ([`normalize`])
//!
//! [`service::RagService`] runs the stages for each request.
//!
//! # Example
//!
//! ```ignore
//! use ocean::db::InMemoryVectorStore;
//! use ocean::rag::{index::DocumentIndex, seed, service::RagService};
//! use std::sync::Arc;
//!
//! let config = ocean::utils::load_config()?;
//! let store = Arc::new(InMemoryVectorStore::new());
//! let index = DocumentIndex::from_config(&config.rag, store).await?;
//! seed::seed_sample_documents(&index).await?;
//!
//! let service = RagService::from_config(&config, Arc::new(index)).await?;
//! println!("{}", service.get_answer("What is the minimum balance?").await);
//! ```

pub mod embeddings;
pub mod index;
pub mod normalize;
pub mod prompt;
pub mod retriever;
pub mod seed;
pub mod service;

pub use index::{DocumentIndex, TextIndex};
pub use retriever::{ContextRetriever, QueryContext};
pub use service::{AnswerReport, AnswerStream, Fragment, RagService};
