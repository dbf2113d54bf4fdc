#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! pakdiff library
//!
//! Compares two versions of a compiled distribution artifact (APK, AAB,
//! AAR, or JAR) and reports what structurally changed between them: file
//! entries, compiled class members, and aggregate download/install size.
//! The library can be used programmatically in addition to the CLI
//! interface.
//!
//! # Basic Example
//!
//! Diffing two JARs built from in-memory bytes:
//!
//! ```no_run
//! use pakdiff::mapping::ApiMapping;
//! use pakdiff::model::Jar;
//! use pakdiff::diff::jar_diff;
//! use pakdiff::report;
//!
//! let old_bytes = std::fs::read("old.jar")?;
//! let new_bytes = std::fs::read("new.jar")?;
//!
//! let old = Jar::parse(&old_bytes, &ApiMapping::empty())?;
//! let new = Jar::parse(&new_bytes, &ApiMapping::empty())?;
//!
//! let result = jar_diff(&old, &new)?;
//! println!("{}", report::render(&result));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # De-obfuscation
//!
//! When a build was shrunk with R8 or ProGuard, supply the mapping file
//! so entries are matched by their original names:
//!
//! ```no_run
//! use pakdiff::mapping::ApiMapping;
//! use pakdiff::model::Apk;
//!
//! let mapping_text = std::fs::read_to_string("mapping.txt")?;
//! let mapping = ApiMapping::parse(&mapping_text)?;
//! let apk = Apk::parse(&std::fs::read("app.apk")?, &mapping)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// ZIP container reading and entry classification
pub mod archive;
/// Compiled-code decoding (DEX and JVM class files)
pub mod bytecode;
/// Diff engine: matching, classification, and the diff result model
pub mod diff;
/// Crate error taxonomy with exit codes and contextual suggestions
pub mod error;
/// Shared formatting utilities for size display
pub mod fmt;
/// R8/ProGuard symbol mapping parsing and name translation
pub mod mapping;
/// Artifact models for the four container formats
pub mod model;
/// Report rendering (text and JSON) over a diff result
pub mod report;

#[cfg(test)]
mod test_fixtures;
