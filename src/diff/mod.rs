//! Diff engine: matching, classification, and the diff result model
//!
//! The engine consumes two freshly constructed, immutable artifact
//! models of the same format and produces a [`DiffResult`], pure data
//! with every collection sorted by canonical identity. It owns no
//! resources, keeps no state across runs, and either completes or
//! fails atomically.

mod matching;

pub use matching::{CategoryDiff, Changed, DiffKey};

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveEntry;
use crate::error::PakdiffError;
use crate::model::{
    Aab, Aar, Apk, Artifact, ArtifactKind, ClassDecl, ClassSummary, FieldDecl, Jar, MethodDecl,
    SizeMetrics,
};

/// An aggregate size seen on both sides of a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDelta {
    /// Old artifact total in bytes
    pub old: u64,
    /// New artifact total in bytes
    pub new: u64,
}

impl SizeDelta {
    /// Signed delta, new minus old.
    pub fn delta(&self) -> i64 {
        self.new as i64 - self.old as i64
    }
}

/// One bundle module's diff, nested inside a bundle-level result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDiff {
    /// Module name
    pub name: String,
    /// The module's own diff result
    pub diff: DiffResult,
}

/// The structured, category-partitioned outcome of one diff operation
///
/// Immutable pure data; rendering it never re-derives a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Format both inputs share
    pub kind: ArtifactKind,
    /// File-level entries of the container
    pub entries: CategoryDiff<ArchiveEntry>,
    /// Compiled classes
    pub classes: CategoryDiff<ClassSummary>,
    /// Compiled methods, matched within their enclosing class
    pub methods: CategoryDiff<MethodDecl>,
    /// Compiled fields, matched within their enclosing class
    pub fields: CategoryDiff<FieldDecl>,
    /// Entries of the embedded `classes.jar` (AAR only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classes_jar: Option<CategoryDiff<ArchiveEntry>>,
    /// Per-module diffs (AAB only)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modules: Vec<ModuleDiff>,
    /// Compressed-bytes aggregate across the whole artifact
    pub download: SizeDelta,
    /// Uncompressed-bytes aggregate across the whole artifact
    pub install: SizeDelta,
}

impl DiffResult {
    /// Whether no difference was detected in any category.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
            && self.classes.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
            && self.classes_jar.as_ref().is_none_or(CategoryDiff::is_empty)
            && self.modules.iter().all(|m| m.diff.is_empty())
    }
}

fn size_delta(old: &SizeMetrics, new: &SizeMetrics) -> (SizeDelta, SizeDelta) {
    (
        SizeDelta {
            old: old.download_size,
            new: new.download_size,
        },
        SizeDelta {
            old: old.install_size,
            new: new.install_size,
        },
    )
}

type MemberDiffs = (
    CategoryDiff<ClassSummary>,
    CategoryDiff<MethodDecl>,
    CategoryDiff<FieldDecl>,
);

fn member_diffs(old: &[ClassDecl], new: &[ClassDecl]) -> Result<MemberDiffs, PakdiffError> {
    let summaries = |classes: &[ClassDecl]| -> Vec<ClassSummary> {
        classes.iter().map(ClassSummary::from).collect()
    };
    let methods = |classes: &[ClassDecl]| -> Vec<MethodDecl> {
        classes.iter().flat_map(|c| c.methods.clone()).collect()
    };
    let fields = |classes: &[ClassDecl]| -> Vec<FieldDecl> {
        classes.iter().flat_map(|c| c.fields.clone()).collect()
    };

    Ok((
        matching::partition("classes", &summaries(old), &summaries(new))?,
        matching::partition("methods", &methods(old), &methods(new))?,
        matching::partition("fields", &fields(old), &fields(new))?,
    ))
}

/// Diff two JARs.
///
/// # Errors
///
/// Returns [`PakdiffError::UnmatchedCategory`] if either model holds
/// duplicate identities.
pub fn jar_diff(old: &Jar, new: &Jar) -> Result<DiffResult, PakdiffError> {
    let entries = matching::partition("entries", &old.entries, &new.entries)?;
    let (classes, methods, fields) = member_diffs(&old.classes, &new.classes)?;
    let (download, install) = size_delta(&old.metrics, &new.metrics);

    Ok(DiffResult {
        kind: ArtifactKind::Jar,
        entries,
        classes,
        methods,
        fields,
        classes_jar: None,
        modules: Vec::new(),
        download,
        install,
    })
}

/// Diff two APKs.
///
/// # Errors
///
/// Returns [`PakdiffError::UnmatchedCategory`] if either model holds
/// duplicate identities.
pub fn apk_diff(old: &Apk, new: &Apk) -> Result<DiffResult, PakdiffError> {
    let entries = matching::partition("entries", &old.entries, &new.entries)?;
    let (classes, methods, fields) = member_diffs(&old.classes, &new.classes)?;
    let (download, install) = size_delta(&old.metrics, &new.metrics);

    Ok(DiffResult {
        kind: ArtifactKind::Apk,
        entries,
        classes,
        methods,
        fields,
        classes_jar: None,
        modules: Vec::new(),
        download,
        install,
    })
}

/// Diff two AARs.
///
/// The embedded `classes.jar` is diffed the way a jar would be, kept
/// as its own category rather than merged with resource entries.
///
/// # Errors
///
/// Returns [`PakdiffError::UnmatchedCategory`] if either model holds
/// duplicate identities.
pub fn aar_diff(old: &Aar, new: &Aar) -> Result<DiffResult, PakdiffError> {
    let entries = matching::partition("entries", &old.entries, &new.entries)?;
    let classes_jar = matching::partition("classes.jar entries", &old.classes_jar, &new.classes_jar)?;
    let (classes, methods, fields) = member_diffs(&old.classes, &new.classes)?;
    let (download, install) = size_delta(&old.metrics, &new.metrics);

    Ok(DiffResult {
        kind: ArtifactKind::Aar,
        entries,
        classes,
        methods,
        fields,
        classes_jar: Some(classes_jar),
        modules: Vec::new(),
        download,
        install,
    })
}

/// Diff two app bundles, module by module.
///
/// Modules are matched by name over the union of both sides; a module
/// missing on one side diffs against an empty module, so its content
/// shows up as wholly added or removed. Top-level aggregates are the
/// sums over all modules.
///
/// # Errors
///
/// Returns [`PakdiffError::UnmatchedCategory`] if any module holds
/// duplicate identities.
pub fn aab_diff(old: &Aab, new: &Aab) -> Result<DiffResult, PakdiffError> {
    let mut names: Vec<&String> = old.modules.keys().chain(new.modules.keys()).collect();
    names.sort();
    names.dedup();

    const NO_ENTRIES: &[ArchiveEntry] = &[];
    const NO_CLASSES: &[ClassDecl] = &[];

    let mut modules = Vec::with_capacity(names.len());
    for name in names {
        let old_module = old.modules.get(name);
        let new_module = new.modules.get(name);

        let old_entries = old_module.map_or(NO_ENTRIES, |m| &m.entries);
        let new_entries = new_module.map_or(NO_ENTRIES, |m| &m.entries);
        let old_classes = old_module.map_or(NO_CLASSES, |m| &m.classes);
        let new_classes = new_module.map_or(NO_CLASSES, |m| &m.classes);

        let entries = matching::partition("entries", old_entries, new_entries)?;
        let (classes, methods, fields) = member_diffs(old_classes, new_classes)?;
        let (download, install) = size_delta(
            &old_module.map_or_else(SizeMetrics::default, |m| m.metrics),
            &new_module.map_or_else(SizeMetrics::default, |m| m.metrics),
        );

        modules.push(ModuleDiff {
            name: name.clone(),
            diff: DiffResult {
                kind: ArtifactKind::Aab,
                entries,
                classes,
                methods,
                fields,
                classes_jar: None,
                modules: Vec::new(),
                download,
                install,
            },
        });
    }

    let (download, install) = size_delta(&old.metrics(), &new.metrics());
    Ok(DiffResult {
        kind: ArtifactKind::Aab,
        entries: CategoryDiff::default(),
        classes: CategoryDiff::default(),
        methods: CategoryDiff::default(),
        fields: CategoryDiff::default(),
        classes_jar: None,
        modules,
        download,
        install,
    })
}

/// Diff two artifacts of any format.
///
/// # Errors
///
/// Returns [`PakdiffError::IncompatibleArtifactKinds`] before any
/// comparison when the inputs are not the same concrete format.
pub fn diff(old: &Artifact, new: &Artifact) -> Result<DiffResult, PakdiffError> {
    match (old, new) {
        (Artifact::Apk(o), Artifact::Apk(n)) => apk_diff(o, n),
        (Artifact::Aab(o), Artifact::Aab(n)) => aab_diff(o, n),
        (Artifact::Aar(o), Artifact::Aar(n)) => aar_diff(o, n),
        (Artifact::Jar(o), Artifact::Jar(n)) => jar_diff(o, n),
        _ => Err(PakdiffError::IncompatibleArtifactKinds {
            old: old.kind(),
            new: new.kind(),
        }),
    }
}
