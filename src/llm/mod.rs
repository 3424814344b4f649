//! Generation Backends and Abstractions
//!
//! This module provides a unified interface over the text-generation backends the
//! assistant can answer with. Provider-specific details live behind the
//! [`LLMClient`] trait; the rest of the crate talks to a [`GenerationAdapter`],
//! which also covers the credential-less mock mode.
//!
//! # Supported Providers
//!
//! - Gemini (always available, configured by API key)
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use ocean::llm::{GenerationAdapter, Provider};
//!
//! let provider = Provider::Gemini {
//!     api_key: std::env::var("GEMINI_API_KEY")?,
//!     api_base: "https://generativelanguage.googleapis.com".to_string(),
//!     model: "gemini-1.5-flash".to_string(),
//! };
//! let adapter = GenerationAdapter::from_provider(Some(&provider)).await?;
//!
//! let generation = adapter.generate("What is 2+2?").await?;
//! println!("{}", generation.text);
//! ```

/// Mock-aware wrapper used by the answer pipeline.
pub mod adapter;
/// Core LLM client trait and provider selection.
pub mod client;
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use adapter::{FragmentStream, Generation, GenerationAdapter, GenerationSource, MOCK_GREETING};
pub use client::{LLMClient, Provider, TextStream};
