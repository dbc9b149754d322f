//! Generation run: load manifests, render every artifact in memory, then
//! write them out and format the Rust sources.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalogue::{Catalogue, CatalogueBuilder};
use crate::emit::{render_connector, render_types};
use crate::error::CodegenError;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::schema_builder::render_schema;

pub const CONNECTOR_OUTPUT_FILE: &str = "connector_generated.rs";
pub const SCHEMA_OUTPUT_FILE: &str = "schema.generated.json";
pub const TYPES_OUTPUT_FILE: &str = "types_generated.rs";

/// Inputs of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root of the connector crate.
    pub path: PathBuf,
    /// Package directories relative to `path`, e.g. `src/functions`.
    pub directories: Vec<String>,
    /// Run `rustfmt` over the generated sources.
    pub format: bool,
}

impl GenerateOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            directories: vec!["src/functions".to_string()],
            format: true,
        }
    }
}

/// A package directory and the module path its declarations live in.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub directory: String,
    pub module: String,
}

/// A rendered file, relative to the crate root.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// `src/functions` -> `crate::functions`; `src` -> `crate`.
pub fn module_path(directory: &str) -> String {
    let trimmed = directory.trim_start_matches("./").trim_end_matches('/');
    let relative = trimmed
        .strip_prefix("src/")
        .or_else(|| (trimmed == "src").then_some(""))
        .unwrap_or(trimmed);
    let mut path = String::from("crate");
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push_str("::");
        path.push_str(segment);
    }
    path
}

/// Reads `signatures.json` from every directory. A directory without a
/// manifest contributes an empty package.
pub fn load_catalogue(options: &GenerateOptions) -> Result<(Catalogue, Vec<Package>), CodegenError> {
    let mut builder = CatalogueBuilder::new();
    let mut packages = Vec::with_capacity(options.directories.len());
    for directory in &options.directories {
        let manifest_path = options.path.join(directory).join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            Manifest::load(&manifest_path)?
        } else {
            warn!("No {} in {}, treating the package as empty", MANIFEST_FILE, directory);
            Manifest::default()
        };
        let package = manifest
            .package
            .clone()
            .unwrap_or_else(|| module_path(directory));
        debug!("Loaded {} as package {}", manifest_path.display(), package);
        builder.add_manifest(&package, manifest)?;
        packages.push(Package {
            directory: directory.trim_start_matches("./").to_string(),
            module: package,
        });
    }
    Ok((builder.build()?, packages))
}

/// Renders all artifacts without touching the filesystem.
pub fn render(catalogue: &Catalogue, packages: &[Package]) -> Result<Vec<Artifact>, CodegenError> {
    let mut artifacts = vec![
        Artifact {
            path: PathBuf::from("src").join(CONNECTOR_OUTPUT_FILE),
            contents: render_connector(catalogue)?,
        },
        Artifact {
            path: PathBuf::from(SCHEMA_OUTPUT_FILE),
            contents: render_schema(catalogue).map_err(CodegenError::Schema)?,
        },
    ];
    for package in packages {
        artifacts.push(Artifact {
            path: Path::new(&package.directory).join(TYPES_OUTPUT_FILE),
            contents: render_types(catalogue, &package.module)?,
        });
    }
    Ok(artifacts)
}

/// Runs a full generation and returns the paths written.
pub fn generate(options: &GenerateOptions) -> Result<Vec<PathBuf>, CodegenError> {
    let start = Instant::now();
    let (catalogue, packages) = load_catalogue(options)?;
    info!(
        functions = catalogue.functions.len(),
        procedures = catalogue.procedures.len(),
        objects = catalogue.objects.len(),
        scalars = catalogue.scalars.len(),
        "Parsed signatures"
    );

    let artifacts = render(&catalogue, &packages)?;
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = options.path.join(&artifact.path);
        write_artifact(&path, &artifact.contents)?;
        info!("Generated {}", path.display());
        written.push(path);
    }

    if options.format {
        let sources: Vec<&Path> = written
            .iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "rs"))
            .map(PathBuf::as_path)
            .collect();
        format_sources(&sources)?;
    }

    info!(exec_time = ?start.elapsed(), "Generated connector");
    Ok(written)
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), CodegenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| CodegenError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| CodegenError::io(path, e))
}

/// Formats `sources` in place. A missing `rustfmt` is not an error.
pub fn format_sources(sources: &[&Path]) -> Result<(), CodegenError> {
    if sources.is_empty() {
        return Ok(());
    }
    let output = Command::new("rustfmt")
        .arg("--edition")
        .arg("2021")
        .args(sources)
        .output();
    match output {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(CodegenError::Format(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("rustfmt not found, generated sources are left unformatted");
            Ok(())
        }
        Err(e) => Err(CodegenError::io("rustfmt", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("src/functions"), "crate::functions");
        assert_eq!(module_path("./src/functions/"), "crate::functions");
        assert_eq!(module_path("src/api/v1"), "crate::api::v1");
        assert_eq!(module_path("src"), "crate");
        assert_eq!(module_path("functions"), "crate::functions");
    }

    #[test]
    fn test_missing_manifest_is_empty_package() {
        let dir = tempfile::tempdir().unwrap();
        let options = GenerateOptions::new(dir.path());
        let (catalogue, packages) = load_catalogue(&options).unwrap();
        assert!(catalogue.functions.is_empty());
        assert!(catalogue.packages.contains("crate::functions"));

        let artifacts = render(&catalogue, &packages).unwrap();
        let paths: Vec<_> = artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/connector_generated.rs"),
                PathBuf::from("schema.generated.json"),
                PathBuf::from("src/functions/types_generated.rs"),
            ]
        );
    }

    #[test]
    fn test_manifest_package_overrides_directory() {
        let dir = tempfile::tempdir().unwrap();
        let functions = dir.path().join("src/handlers");
        fs::create_dir_all(&functions).unwrap();
        fs::write(
            functions.join(MANIFEST_FILE),
            r#"{"package": "crate::api", "functions": [{"origin": "f", "result": {"kind": "string"}}]}"#,
        )
        .unwrap();

        let mut options = GenerateOptions::new(dir.path());
        options.directories = vec!["src/handlers".to_string()];
        let (catalogue, packages) = load_catalogue(&options).unwrap();
        assert_eq!(catalogue.functions["f"].package, "crate::api");
        assert_eq!(
            packages,
            vec![Package {
                directory: "src/handlers".to_string(),
                module: "crate::api".to_string(),
            }]
        );
    }

    #[test]
    fn test_format_nothing_is_ok() {
        assert!(format_sources(&[]).is_ok());
    }
}
