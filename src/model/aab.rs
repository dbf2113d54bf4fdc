//! Android app bundle model
//!
//! A bundle is a ZIP whose top-level directories are modules (`base/`
//! plus feature modules). The bundle is decomposed into per-module
//! sub-artifacts first; diffing happens module by module. Bundles are
//! compared without an external mapping input, so members keep the
//! names stored in the bundle.

use std::collections::BTreeMap;

use crate::archive::{Archive, ArchiveEntry, EntryKind};
use crate::bytecode::dex;
use crate::error::PakdiffError;
use crate::mapping::ApiMapping;
use crate::model::members::{translate_classes, ClassDecl};
use crate::model::SizeMetrics;

/// Pseudo-module holding bundle-level files (`BundleConfig.pb`, ...)
pub const ROOT_MODULE: &str = "<root>";

/// One module of a bundle, a self-contained sub-artifact
#[derive(Debug)]
pub struct AabModule {
    /// Module name (top-level directory), or [`ROOT_MODULE`]
    pub name: String,
    /// Entries under this module, full bundle paths
    pub entries: Vec<ArchiveEntry>,
    /// Classes from this module's `dex/` payloads, sorted by name
    pub classes: Vec<ClassDecl>,
    /// Aggregate sizes computed from this module's `entries`
    pub metrics: SizeMetrics,
}

/// An immutable snapshot of one `.aab` input
#[derive(Debug)]
pub struct Aab {
    /// Modules keyed by name; BTreeMap keeps module order stable
    pub modules: BTreeMap<String, AabModule>,
}

impl Aab {
    /// Parse a bundle from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] on a malformed archive
    /// or dex payload; no partial model is produced.
    pub fn parse(bytes: &[u8]) -> Result<Aab, PakdiffError> {
        Aab::parse_named(bytes, "aab")
    }

    pub(crate) fn parse_named(bytes: &[u8], context: &str) -> Result<Aab, PakdiffError> {
        let mut archive = Archive::open(bytes, context)?;

        let mut grouped: BTreeMap<String, Vec<ArchiveEntry>> = BTreeMap::new();
        for entry in archive.entries() {
            let module = match entry.path.split_once('/') {
                Some((module, _)) => module.to_string(),
                None => ROOT_MODULE.to_string(),
            };
            grouped.entry(module).or_default().push(entry.clone());
        }

        let mut modules = BTreeMap::new();
        for (name, entries) in grouped {
            let mut raw = Vec::new();
            for entry in entries.iter().filter(|e| e.kind == EntryKind::Dex) {
                let data = archive.read(&entry.path)?;
                raw.extend(dex::parse(&data, &format!("{context} entry {}", entry.path))?);
            }
            let classes = translate_classes(raw, &ApiMapping::empty());
            let metrics = SizeMetrics::from_entries(&entries);
            modules.insert(
                name.clone(),
                AabModule {
                    name,
                    entries,
                    classes,
                    metrics,
                },
            );
        }

        log::debug!("decoded {context}: {} modules", modules.len());
        Ok(Aab { modules })
    }

    /// Bundle-wide aggregate sizes, the sum over all modules.
    pub fn metrics(&self) -> SizeMetrics {
        let mut total = SizeMetrics::default();
        for module in self.modules.values() {
            total.download_size += module.metrics.download_size;
            total.install_size += module.metrics.install_size;
            total.entry_count += module.metrics.entry_count;
        }
        total
    }
}
