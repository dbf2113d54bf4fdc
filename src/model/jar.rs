//! Java archive model

use crate::archive::{Archive, ArchiveEntry, EntryKind};
use crate::bytecode::class_file;
use crate::error::PakdiffError;
use crate::mapping::ApiMapping;
use crate::model::members::{translate_classes, ClassDecl};
use crate::model::SizeMetrics;

/// An immutable snapshot of one `.jar` input
#[derive(Debug)]
pub struct Jar {
    /// Archive entries in storage order
    pub entries: Vec<ArchiveEntry>,
    /// De-obfuscated classes from `*.class` entries, sorted by name
    pub classes: Vec<ClassDecl>,
    /// Aggregate sizes computed from `entries`
    pub metrics: SizeMetrics,
}

impl Jar {
    /// Parse a jar from raw bytes, translating members through `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] on a malformed archive
    /// or class file; no partial model is produced.
    pub fn parse(bytes: &[u8], mapping: &ApiMapping) -> Result<Jar, PakdiffError> {
        Jar::parse_named(bytes, mapping, "jar")
    }

    pub(crate) fn parse_named(
        bytes: &[u8],
        mapping: &ApiMapping,
        context: &str,
    ) -> Result<Jar, PakdiffError> {
        let mut archive = Archive::open(bytes, context)?;
        let entries = archive.entries().to_vec();

        let mut raw = Vec::new();
        for path in archive.paths_where(|e| e.kind == EntryKind::Class) {
            let data = archive.read(&path)?;
            raw.push(class_file::parse(&data, &format!("{context} entry {path}"))?);
        }

        let classes = translate_classes(raw, mapping);
        let metrics = SizeMetrics::from_entries(&entries);
        log::debug!(
            "decoded {context}: {} entries, {} classes",
            entries.len(),
            classes.len()
        );

        Ok(Jar {
            entries,
            classes,
            metrics,
        })
    }
}
