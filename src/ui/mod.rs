//! Terminal presentation helpers

pub mod output;
