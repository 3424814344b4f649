//! Vector stores.
//!
//! Storage for embedded knowledge-base documents. The crate ships an
//! in-memory, cosine-similarity store; other backends plug in through the
//! [`VectorStore`] trait.

pub mod vectorstore;

pub use vectorstore::{InMemoryVectorStore, VectorStore};
