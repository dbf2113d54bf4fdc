//! Artifact models for the four container formats
//!
//! Each model is an immutable snapshot of one input file: its archive
//! entries, its compiled members (already de-obfuscated), and its
//! aggregate size metrics. Two models of the same concrete format feed
//! one diff operation; the models are never mutated afterwards.

mod aab;
mod aar;
mod apk;
mod jar;
/// De-obfuscated compiled member declarations
pub mod members;

pub use aab::{Aab, AabModule};
pub use aar::Aar;
pub use apk::Apk;
pub use jar::Jar;
pub use members::{ClassDecl, ClassSummary, FieldDecl, MethodDecl};

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveEntry;
use crate::error::PakdiffError;
use crate::mapping::ApiMapping;

/// The four supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Android application package
    Apk,
    /// Android app bundle
    Aab,
    /// Android library archive
    Aar,
    /// Java archive
    Jar,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtifactKind::Apk => "apk",
            ArtifactKind::Aab => "aab",
            ArtifactKind::Aar => "aar",
            ArtifactKind::Jar => "jar",
        };
        f.write_str(label)
    }
}

/// Aggregate size metrics of one artifact snapshot
///
/// Computed from the same entries the diff engine classifies, so the
/// top-level delta is always consistent with the per-entry arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMetrics {
    /// Sum of compressed entry sizes (bytes over the wire)
    pub download_size: u64,
    /// Sum of uncompressed entry sizes (bytes on device)
    pub install_size: u64,
    /// Number of stored entries
    pub entry_count: usize,
}

impl SizeMetrics {
    pub(crate) fn from_entries(entries: &[ArchiveEntry]) -> SizeMetrics {
        SizeMetrics {
            download_size: entries.iter().map(|e| e.compressed_size).sum(),
            install_size: entries.iter().map(|e| e.uncompressed_size).sum(),
            entry_count: entries.len(),
        }
    }
}

/// One parsed input of any supported format
pub enum Artifact {
    /// Android application package
    Apk(Apk),
    /// Android app bundle
    Aab(Aab),
    /// Android library archive
    Aar(Aar),
    /// Java archive
    Jar(Jar),
}

impl Artifact {
    /// Parse raw bytes as the given format.
    ///
    /// The mapping is applied during member extraction for APK, AAR,
    /// and JAR; bundles carry no mapping input (they are compared at
    /// module level).
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] on any container or
    /// bytecode decode failure; no partial model is produced.
    pub fn parse(
        kind: ArtifactKind,
        bytes: &[u8],
        mapping: &ApiMapping,
        context: &str,
    ) -> Result<Artifact, PakdiffError> {
        match kind {
            ArtifactKind::Apk => Apk::parse_named(bytes, mapping, context).map(Artifact::Apk),
            ArtifactKind::Aab => Aab::parse_named(bytes, context).map(Artifact::Aab),
            ArtifactKind::Aar => Aar::parse_named(bytes, mapping, context).map(Artifact::Aar),
            ArtifactKind::Jar => Jar::parse_named(bytes, mapping, context).map(Artifact::Jar),
        }
    }

    /// The concrete format of this artifact.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Apk(_) => ArtifactKind::Apk,
            Artifact::Aab(_) => ArtifactKind::Aab,
            Artifact::Aar(_) => ArtifactKind::Aar,
            Artifact::Jar(_) => ArtifactKind::Jar,
        }
    }
}
