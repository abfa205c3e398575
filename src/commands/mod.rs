//! CLI commands for upkeep
//!
//! - **run**: run maintenance across all opted-in packages (or a subset)
//! - **list**: show opted-in packages and what was resolved for each
//! - **version**: print the next patch version of one package
//!
//! All commands take `&RunContext` built once in main.rs.

pub mod list;
pub mod run;
pub mod version;

pub use list::run_list;
pub use run::run_maintenance;
pub use version::run_next_version;
