//! Core building blocks shared by every command
//!
//! - **config**: upkeep.toml parsing, defaults and validation
//! - **context**: run context built once from CLI flags and config
//! - **error**: error types with contextual help messages and exit codes
//! - **exec**: external command execution with explicit working directories
//! - **vcs**: git operations via the system git binary (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod vcs;
