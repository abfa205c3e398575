//! Text-file edits made for each maintenance release
//!
//! - **version**: find the one `__version__ = "MAJOR.MINOR.PATCH"` assignment,
//!   compute the next patch version (`peek_next_version`) or persist it
//!   (`commit_increment`)
//! - **changelog**: insert a dated maintenance entry at a fixed line offset
//!
//! Computing the next version and writing it are separate steps: the
//! branch name depends on the next version long before the workflow knows
//! whether any file will change.

pub mod changelog;
pub mod version;

pub use changelog::{ChangelogEntry, append_entry};
pub use version::{commit_increment, peek_next_version};
