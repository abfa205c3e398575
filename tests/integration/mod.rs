//! Integration tests: drive the upkeep binary against throwaway package checkouts

#![cfg(unix)]

mod test_list;
mod test_run;
mod test_version;
