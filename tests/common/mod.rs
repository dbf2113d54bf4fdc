//! Common test utilities and helpers
//!
//! Shared fixture builders for integration tests: in-memory ZIP
//! construction and on-disk artifact/mapping files backed by tempfile.

pub mod fixtures;
