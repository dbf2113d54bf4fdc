//! Android application package model

use crate::archive::{Archive, ArchiveEntry, EntryKind};
use crate::bytecode::dex;
use crate::error::PakdiffError;
use crate::mapping::ApiMapping;
use crate::model::members::{translate_classes, ClassDecl};
use crate::model::SizeMetrics;

/// An immutable snapshot of one `.apk` input
#[derive(Debug)]
pub struct Apk {
    /// Archive entries in storage order
    pub entries: Vec<ArchiveEntry>,
    /// De-obfuscated classes merged from all `classes*.dex`, sorted by name
    pub classes: Vec<ClassDecl>,
    /// Aggregate sizes computed from `entries`
    pub metrics: SizeMetrics,
}

impl Apk {
    /// Parse an apk from raw bytes, translating members through `mapping`.
    ///
    /// All dex files of a multidex split are merged into one class set.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] on a malformed archive
    /// or dex payload; no partial model is produced.
    pub fn parse(bytes: &[u8], mapping: &ApiMapping) -> Result<Apk, PakdiffError> {
        Apk::parse_named(bytes, mapping, "apk")
    }

    pub(crate) fn parse_named(
        bytes: &[u8],
        mapping: &ApiMapping,
        context: &str,
    ) -> Result<Apk, PakdiffError> {
        let mut archive = Archive::open(bytes, context)?;
        let entries = archive.entries().to_vec();

        let mut raw = Vec::new();
        for path in archive.paths_where(|e| e.kind == EntryKind::Dex) {
            let data = archive.read(&path)?;
            raw.extend(dex::parse(&data, &format!("{context} entry {path}"))?);
        }

        let classes = translate_classes(raw, mapping);
        let metrics = SizeMetrics::from_entries(&entries);
        log::debug!(
            "decoded {context}: {} entries, {} classes",
            entries.len(),
            classes.len()
        );

        Ok(Apk {
            entries,
            classes,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{build_zip, minimal_dex_bytes};

    #[test]
    fn test_parse_apk_with_dex() {
        let bytes = build_zip(&[
            ("AndroidManifest.xml", b"\x03\x00\x08\x00".as_slice()),
            ("classes.dex", &minimal_dex_bytes()),
            ("res/layout/main.xml", b"<layout/>"),
        ]);

        let apk = Apk::parse(&bytes, &ApiMapping::empty()).unwrap();
        assert_eq!(apk.entries.len(), 3);
        assert_eq!(apk.classes.len(), 1);
        assert_eq!(apk.classes[0].name, "a.A");
        assert_eq!(apk.classes[0].methods.len(), 2);
    }

    #[test]
    fn test_mapping_applied_during_construction() {
        let mapping = ApiMapping::parse("com.example.App -> a.A:\n").unwrap();
        let bytes = build_zip(&[("classes.dex", minimal_dex_bytes().as_slice())]);

        let apk = Apk::parse(&bytes, &mapping).unwrap();
        assert_eq!(apk.classes[0].name, "com.example.App");
        assert_eq!(apk.classes[0].methods[0].owner, "com.example.App");
    }

    #[test]
    fn test_corrupt_dex_aborts_whole_parse() {
        let bytes = build_zip(&[("classes.dex", b"dex\n035\0truncated".as_slice())]);
        let err = Apk::parse(&bytes, &ApiMapping::empty()).unwrap_err();
        assert!(err.to_string().contains("classes.dex"));
    }
}
