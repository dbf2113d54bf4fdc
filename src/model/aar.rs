//! Android library archive model
//!
//! An `.aar` wraps resources and a nested `classes.jar`. The nested
//! jar's entries are kept as their own category rather than merged
//! with the outer resource entries, and its class files supply the
//! compiled member set.

use crate::archive::{Archive, ArchiveEntry};
use crate::error::PakdiffError;
use crate::mapping::ApiMapping;
use crate::model::members::ClassDecl;
use crate::model::{Jar, SizeMetrics};

const CLASSES_JAR: &str = "classes.jar";

/// An immutable snapshot of one `.aar` input
#[derive(Debug)]
pub struct Aar {
    /// Outer archive entries in storage order
    pub entries: Vec<ArchiveEntry>,
    /// Entries of the embedded `classes.jar`, empty when absent
    pub classes_jar: Vec<ArchiveEntry>,
    /// De-obfuscated classes from the embedded `classes.jar`
    pub classes: Vec<ClassDecl>,
    /// Aggregate sizes computed from the outer `entries`
    pub metrics: SizeMetrics,
}

impl Aar {
    /// Parse an aar from raw bytes, translating members through `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] when the outer archive
    /// or the embedded `classes.jar` fails to decode.
    pub fn parse(bytes: &[u8], mapping: &ApiMapping) -> Result<Aar, PakdiffError> {
        Aar::parse_named(bytes, mapping, "aar")
    }

    pub(crate) fn parse_named(
        bytes: &[u8],
        mapping: &ApiMapping,
        context: &str,
    ) -> Result<Aar, PakdiffError> {
        let mut archive = Archive::open(bytes, context)?;
        let entries = archive.entries().to_vec();

        let (classes_jar, classes) = if entries.iter().any(|e| e.path == CLASSES_JAR) {
            let jar_bytes = archive.read(CLASSES_JAR)?;
            let jar = Jar::parse_named(&jar_bytes, mapping, &format!("{context} {CLASSES_JAR}"))?;
            (jar.entries, jar.classes)
        } else {
            (Vec::new(), Vec::new())
        };

        let metrics = SizeMetrics::from_entries(&entries);
        log::debug!(
            "decoded {context}: {} entries, {} nested jar entries, {} classes",
            entries.len(),
            classes_jar.len(),
            classes.len()
        );

        Ok(Aar {
            entries,
            classes_jar,
            classes,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{build_zip, minimal_class_bytes};

    #[test]
    fn test_parse_aar_with_nested_classes_jar() {
        let inner = build_zip(&[("a/A.class", minimal_class_bytes().as_slice())]);
        let bytes = build_zip(&[
            ("AndroidManifest.xml", b"<manifest/>".as_slice()),
            ("classes.jar", &inner),
            ("res/values/values.xml", b"<resources/>"),
        ]);

        let aar = Aar::parse(&bytes, &ApiMapping::empty()).unwrap();
        assert_eq!(aar.entries.len(), 3);
        assert_eq!(aar.classes_jar.len(), 1);
        assert_eq!(aar.classes.len(), 1);
        assert_eq!(aar.classes[0].name, "a.A");
    }

    #[test]
    fn test_aar_without_classes_jar() {
        let bytes = build_zip(&[("AndroidManifest.xml", b"<manifest/>".as_slice())]);
        let aar = Aar::parse(&bytes, &ApiMapping::empty()).unwrap();
        assert!(aar.classes_jar.is_empty());
        assert!(aar.classes.is_empty());
    }

    #[test]
    fn test_corrupt_nested_jar_aborts_whole_parse() {
        let bytes = build_zip(&[("classes.jar", b"not a zip".as_slice())]);
        let err = Aar::parse(&bytes, &ApiMapping::empty()).unwrap_err();
        assert!(err.to_string().contains("classes.jar"));
    }
}
