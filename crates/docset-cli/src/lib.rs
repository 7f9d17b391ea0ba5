//! docset CLI internals.
//!
//! The binary in `main.rs` is a thin shell around these modules:
//!
//! - `collaborators`: filesystem-backed implementations of the build traits
//! - `pipeline`: rule loading, TOC discovery, and the parallel build driver
//! - `summary`: end-of-build diagnostics table
//! - `logging`: tracing subscriber setup

pub mod cli;
pub mod collaborators;
pub mod logging;
pub mod pipeline;
pub mod summary;
