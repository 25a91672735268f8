//! `webups` library crate.
//!
//! The collector reads sensor tables, polls the device web interface and
//! builds a JSON snapshot; the `check` module evaluates that snapshot.
//! The binaries live in `main.rs` (collector) and `bin/webups_check.rs`.

pub mod check;
pub mod collector;
pub mod config;
pub mod outcome;
pub mod sensors;
