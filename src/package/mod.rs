//! Package checkouts under the packages directory
//!
//! - **scanner**: find opted-in package directories (sentinel subdirectory present)
//! - **metadata**: read `main_branch` / module name from the sentinel metadata file
//! - **environment**: locate the package's isolated executable

pub mod environment;
pub mod metadata;
pub mod scanner;

pub use environment::resolve_executable;
pub use metadata::{PackageMetadata, main_branch_name};
pub use scanner::{PackageDir, scan};
