use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::process;

use pakdiff::error::{ErrorFormatter, PakdiffError};
use pakdiff::mapping::ApiMapping;
use pakdiff::model::{Artifact, ArtifactKind};
use pakdiff::{diff, report};

/// Structural diff for compiled distribution artifacts
///
/// pakdiff compares two versions of an APK, AAB, AAR, or JAR and reports
/// what changed between them: file entries, compiled classes, methods and
/// fields, and aggregate download/install size.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("format").args(["apk", "aab", "aar", "jar"])))]
pub struct Cli {
    /// Treat the inputs as APKs (the default)
    #[arg(long)]
    apk: bool,

    /// Treat the inputs as Android app bundles
    #[arg(long)]
    aab: bool,

    /// Treat the inputs as Android library archives
    #[arg(long)]
    aar: bool,

    /// Treat the inputs as Java archives
    #[arg(long)]
    jar: bool,

    /// R8/ProGuard mapping file for the old artifact
    #[arg(long, value_name = "FILE", conflicts_with = "aab")]
    old_mapping: Option<PathBuf>,

    /// R8/ProGuard mapping file for the new artifact
    #[arg(long, value_name = "FILE", conflicts_with = "aab")]
    new_mapping: Option<PathBuf>,

    /// Output as JSON (for CI/CD integration)
    #[arg(long)]
    json: bool,

    /// The old artifact
    #[arg(value_name = "OLD")]
    old: PathBuf,

    /// The new artifact
    #[arg(value_name = "NEW")]
    new: PathBuf,
}

impl Cli {
    fn kind(&self) -> ArtifactKind {
        if self.aab {
            ArtifactKind::Aab
        } else if self.aar {
            ArtifactKind::Aar
        } else if self.jar {
            ArtifactKind::Jar
        } else {
            ArtifactKind::Apk
        }
    }
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}", ErrorFormatter::format(&e));
        process::exit(ErrorFormatter::exit_code(&e));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let kind = cli.kind();
    let old_mapping = load_mapping(cli.old_mapping.as_deref())?;
    let new_mapping = load_mapping(cli.new_mapping.as_deref())?;

    let old_bytes = read_input(&cli.old)?;
    let new_bytes = read_input(&cli.new)?;

    // The two models are independent; decode them in parallel.
    let (old, new) = rayon::join(
        || Artifact::parse(kind, &old_bytes, &old_mapping, &cli.old.display().to_string()),
        || Artifact::parse(kind, &new_bytes, &new_mapping, &cli.new.display().to_string()),
    );
    let (old, new) = (old?, new?);

    let result = diff::diff(&old, &new)?;
    if cli.json {
        println!("{}", report::render_json(&result)?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, PakdiffError> {
    std::fs::read(path).map_err(|source| PakdiffError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_mapping(path: Option<&Path>) -> Result<ApiMapping, PakdiffError> {
    match path {
        None => Ok(ApiMapping::empty()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| PakdiffError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ApiMapping::parse(&text)
        }
    }
}
