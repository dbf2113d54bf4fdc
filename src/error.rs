//! Crate error taxonomy with exit codes and contextual suggestions
//!
//! Every failure mode of a diff run maps to one variant here. All of
//! them are fatal to the single operation: diffing is a pure,
//! deterministic computation with no transient-failure modes, so there
//! is no retry path. The CLI turns an error into a styled message and a
//! sysexits-style exit code; the engine itself never logs or recovers.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ArtifactKind;

/// Errors produced while constructing models or diffing artifacts
#[derive(Error, Debug)]
pub enum PakdiffError {
    /// Mapping file does not follow the R8/ProGuard line grammar
    #[error("malformed mapping file at line {line}: {reason}")]
    MalformedMapping {
        /// 1-based line number of the offending line
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// Archive or compiled-code decoding failure
    #[error("failed to decode {context}: {reason}")]
    ArtifactDecode {
        /// What was being decoded (file path, entry name, dex section)
        context: String,
        /// Underlying decode failure
        reason: String,
    },

    /// The two inputs are not the same concrete format
    #[error("cannot diff a {old} against a {new}")]
    IncompatibleArtifactKinds {
        /// Kind of the old input
        old: ArtifactKind,
        /// Kind of the new input
        new: ArtifactKind,
    },

    /// Duplicate canonical identity within one model (internal invariant)
    #[error("duplicate {category} identity within one artifact: {key}")]
    UnmatchedCategory {
        /// Category whose bookkeeping was violated
        category: &'static str,
        /// The duplicated identity key
        key: String,
    },

    /// File could not be read
    #[error("failed to read {path}")]
    Io {
        /// Path that could not be read
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl PakdiffError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakdiff::error::PakdiffError;
    /// use pakdiff::model::ArtifactKind;
    ///
    /// let err = PakdiffError::IncompatibleArtifactKinds {
    ///     old: ArtifactKind::Apk,
    ///     new: ArtifactKind::Jar,
    /// };
    /// assert!(err.suggestion().is_some());
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MalformedMapping { line, .. } => Some(format!(
                "Check line {} of the mapping file. Expected a class header \
                 ('original.Name -> obfuscated:') or an indented member line",
                line
            )),
            Self::ArtifactDecode { context, .. } => Some(format!(
                "Verify that {} is a complete, uncorrupted archive of the selected format",
                context
            )),
            Self::IncompatibleArtifactKinds { .. } => Some(
                "Both inputs must be the same format. Pass --apk, --aab, --aar or --jar \
                 matching the files being compared"
                    .to_string(),
            ),
            Self::UnmatchedCategory { .. } => Some(
                "This indicates a defect in model construction; please report it with the \
                 input artifacts if possible"
                    .to_string(),
            ),
            Self::Io { path, .. } => Some(format!(
                "Check that {} exists and is readable",
                path.display()
            )),
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Follows sysexits.h conventions where one applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakdiff::error::PakdiffError;
    ///
    /// let err = PakdiffError::MalformedMapping {
    ///     line: 3,
    ///     reason: "unindented member line".to_string(),
    /// };
    /// assert_eq!(err.exit_code(), 65); // EX_DATAERR
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedMapping { .. } => 65, // EX_DATAERR
            Self::ArtifactDecode { .. } => 65,   // EX_DATAERR
            Self::IncompatibleArtifactKinds { .. } => 64, // EX_USAGE
            Self::UnmatchedCategory { .. } => 70, // EX_SOFTWARE
            Self::Io { .. } => 66,               // EX_NOINPUT
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with cause chain and suggestion
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(pd_error) = error.downcast_ref::<PakdiffError>() {
            if let Some(suggestion) = pd_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        if let Some(pd_error) = error.downcast_ref::<PakdiffError>() {
            pd_error.exit_code()
        } else {
            1 // Generic error
        }
    }
}
