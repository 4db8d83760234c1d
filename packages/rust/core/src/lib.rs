//! Core pipeline orchestration for ChatBlocks.
//!
//! This crate ties the parser and categorizers together into the `organize`
//! workflow, exposes it through a JSON request/response boundary, and keeps
//! the last result on disk for later display and search.

pub mod history;
pub mod pipeline;
pub mod request;
pub mod search;

pub use history::{RunId, SavedRun, load_last_run, save_run};
pub use pipeline::{OrganizeResult, ProgressReporter, SilentProgress, organize};
pub use request::{OrganizeRequest, OrganizeResponse, handle_organize, handle_organize_raw};
pub use search::{filter_blocks, matches_search};
