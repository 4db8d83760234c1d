//! Shared types, error model, and configuration for chatblocks.
//!
//! This crate is the foundation depended on by all other chatblocks crates.
//! It provides:
//! - [`ChatBlocksError`]: the unified error type
//! - Domain types ([`MessagePair`], [`BlockCategory`], [`SemanticBlock`])
//! - Configuration ([`AppConfig`], [`OpenAiConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategorizerConfig, OpenAiConfig, StorageConfig, USE_AI_ENV, ai_enabled,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ChatBlocksError, Result};
pub use types::{
    BlockCategory, CategoryMeta, Message, MessagePair, Role, SemanticBlock, UnknownCategory,
};
