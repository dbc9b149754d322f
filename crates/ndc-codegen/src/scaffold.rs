//! Boilerplate for a new connector crate.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CodegenError;
use crate::generator::{generate, GenerateOptions};
use crate::manifest::MANIFEST_FILE;

const TEMPLATES: &[(&str, &str)] = &[
    ("Cargo.toml", include_str!("../templates/Cargo.toml.tmpl")),
    ("README.md", include_str!("../templates/README.md.tmpl")),
    ("src/main.rs", include_str!("../templates/main.rs.tmpl")),
    ("src/types.rs", include_str!("../templates/types.rs.tmpl")),
    ("src/functions/mod.rs", include_str!("../templates/functions.rs.tmpl")),
];

const SIGNATURES_TEMPLATE: &str = include_str!("../templates/signatures.json.tmpl");

#[derive(Debug, Clone)]
pub struct NewProject {
    /// Connector (and binary) name.
    pub name: String,
    /// Cargo package name.
    pub module: String,
    /// Target directory. Defaults to `./<name>`.
    pub output: Option<PathBuf>,
    pub format: bool,
}

impl NewProject {
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(&self.name))
    }
}

/// Writes the scaffold, then runs a generation over it. Refuses to write into
/// a non-empty directory.
pub fn new_project(project: &NewProject) -> Result<PathBuf, CodegenError> {
    let root = project.output_dir();
    if is_non_empty_dir(&root)? {
        return Err(CodegenError::ProjectExists(root));
    }

    for (relative, template) in TEMPLATES {
        write_template(&root, relative, &render_template(template, project))?;
    }
    write_template(
        &root,
        &format!("src/functions/{MANIFEST_FILE}"),
        SIGNATURES_TEMPLATE,
    )?;
    info!("Wrote boilerplate to {}", root.display());

    let mut options = GenerateOptions::new(&root);
    options.format = project.format;
    generate(&options)?;
    Ok(root)
}

fn render_template(template: &str, project: &NewProject) -> String {
    template
        .replace("{{name}}", &project.name)
        .replace("{{module}}", &project.module)
}

fn write_template(root: &Path, relative: &str, contents: &str) -> Result<(), CodegenError> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
    }
    fs::write(&path, contents).map_err(|e| CodegenError::io(&path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn is_non_empty_dir(path: &Path) -> Result<bool, CodegenError> {
    match fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CodegenError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(output: &Path) -> NewProject {
        NewProject {
            name: "example".to_string(),
            module: "example-connector".to_string(),
            output: Some(output.to_path_buf()),
            format: false,
        }
    }

    #[test]
    fn test_new_project_writes_scaffold_and_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("example");
        new_project(&project(&root)).unwrap();

        let cargo = fs::read_to_string(root.join("Cargo.toml")).unwrap();
        assert!(cargo.contains("name = \"example-connector\""));
        assert!(cargo.contains("name = \"example\""));
        assert!(!cargo.contains("{{"));

        for file in [
            "README.md",
            "src/main.rs",
            "src/types.rs",
            "src/functions/mod.rs",
            "src/functions/signatures.json",
            "src/connector_generated.rs",
            "src/functions/types_generated.rs",
            "schema.generated.json",
        ] {
            assert!(root.join(file).is_file(), "missing {file}");
        }

        let connector = fs::read_to_string(root.join("src/connector_generated.rs")).unwrap();
        assert!(connector.contains("functions::function_hello(ctx, state, &args)"));
    }

    #[test]
    fn test_refuses_non_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        let err = new_project(&project(dir.path())).unwrap_err();
        assert!(matches!(err, CodegenError::ProjectExists(_)));
    }

    #[test]
    fn test_output_defaults_to_name() {
        let mut p = project(Path::new(""));
        assert_eq!(p.output_dir(), PathBuf::from("example"));
        p.output = None;
        assert_eq!(p.output_dir(), PathBuf::from("example"));
    }
}
