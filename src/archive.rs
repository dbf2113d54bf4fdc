//! ZIP container reading and entry classification
//!
//! All four artifact formats are ZIP containers. This module walks the
//! central directory once, producing one [`ArchiveEntry`] per stored
//! file (directories are skipped) with the metadata the diff engine
//! compares: path, both sizes, and the CRC-32 content checksum. Entry
//! payloads are only decompressed on demand, for nested containers
//! (`classes.jar`) and compiled-code entries.

use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::PakdiffError;

/// Coarse classification of an archive entry by its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Compiled Dalvik bytecode (`classes.dex`, `classes2.dex`, ...)
    Dex,
    /// `AndroidManifest.xml`
    Manifest,
    /// Android resources (`res/`, `resources.arsc`)
    Resource,
    /// Raw assets (`assets/`)
    Asset,
    /// Native shared library (`*.so`)
    NativeLibrary,
    /// JVM class file (`*.class`)
    Class,
    /// Anything else
    Other,
}

impl EntryKind {
    /// Classify a path within an artifact.
    pub fn classify(path: &str) -> EntryKind {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name.ends_with(".dex") {
            EntryKind::Dex
        } else if file_name == "AndroidManifest.xml" {
            EntryKind::Manifest
        } else if file_name == "resources.arsc"
            || path.starts_with("res/")
            || path.contains("/res/")
        {
            EntryKind::Resource
        } else if path.starts_with("assets/") || path.contains("/assets/") {
            EntryKind::Asset
        } else if file_name.ends_with(".so") {
            EntryKind::NativeLibrary
        } else if file_name.ends_with(".class") {
            EntryKind::Class
        } else {
            EntryKind::Other
        }
    }

    /// Display label used in report breakdowns.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Dex => "dex",
            EntryKind::Manifest => "manifest",
            EntryKind::Resource => "resource",
            EntryKind::Asset => "asset",
            EntryKind::NativeLibrary => "native",
            EntryKind::Class => "class",
            EntryKind::Other => "other",
        }
    }

    /// All kinds in report order.
    pub const ALL: [EntryKind; 7] = [
        EntryKind::Dex,
        EntryKind::Manifest,
        EntryKind::Resource,
        EntryKind::Asset,
        EntryKind::NativeLibrary,
        EntryKind::Class,
        EntryKind::Other,
    ];
}

/// One stored file inside a container artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Path within the archive, unique per artifact
    pub path: String,
    /// Size after decompression
    pub uncompressed_size: u64,
    /// Size as stored in the archive
    pub compressed_size: u64,
    /// CRC-32 of the uncompressed content
    pub crc32: u32,
    /// Path-based classification
    pub kind: EntryKind,
}

/// An opened ZIP container with its entry metadata pre-read
#[derive(Debug)]
pub struct Archive<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
    entries: Vec<ArchiveEntry>,
    context: String,
}

impl<'a> Archive<'a> {
    /// Open a container from raw bytes.
    ///
    /// `context` names the input in decode errors (file path or nested
    /// entry name).
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] when the bytes are not
    /// a readable ZIP archive.
    pub fn open(bytes: &'a [u8], context: &str) -> Result<Archive<'a>, PakdiffError> {
        let mut zip =
            ZipArchive::new(Cursor::new(bytes)).map_err(|err| PakdiffError::ArtifactDecode {
                context: context.to_string(),
                reason: err.to_string(),
            })?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip
                .by_index_raw(index)
                .map_err(|err| PakdiffError::ArtifactDecode {
                    context: context.to_string(),
                    reason: format!("entry {index}: {err}"),
                })?;
            if file.is_dir() {
                continue;
            }
            let path = file.name().to_string();
            entries.push(ArchiveEntry {
                kind: EntryKind::classify(&path),
                path,
                uncompressed_size: file.size(),
                compressed_size: file.compressed_size(),
                crc32: file.crc32(),
            });
        }

        Ok(Archive {
            zip,
            entries,
            context: context.to_string(),
        })
    }

    /// Entry metadata in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Decompress one entry's payload.
    ///
    /// # Errors
    ///
    /// Returns [`PakdiffError::ArtifactDecode`] when the entry is
    /// missing, uses an unsupported compression method, or is
    /// truncated.
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>, PakdiffError> {
        let mut file = self
            .zip
            .by_name(path)
            .map_err(|err| PakdiffError::ArtifactDecode {
                context: format!("{} entry {}", self.context, path),
                reason: err.to_string(),
            })?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|err| PakdiffError::ArtifactDecode {
                context: format!("{} entry {}", self.context, path),
                reason: err.to_string(),
            })?;
        Ok(buf)
    }

    /// Paths of entries matching a predicate, in archive order.
    pub fn paths_where(&self, predicate: impl Fn(&ArchiveEntry) -> bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| predicate(e))
            .map(|e| e.path.clone())
            .collect()
    }
}
