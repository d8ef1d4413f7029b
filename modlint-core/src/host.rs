//! Host adapter: materializing a [`ProjectModel`] from a build-system
//! export.
//!
//! Hosts serialize their module graph to a JSON document listing each
//! module's path, dependency declarations, source-set roots, and flags.
//! Source-set entries may be single files or directories; directories are
//! walked recursively and filtered to the language kinds the extractor
//! understands. Unreadable directory entries are skipped with a debug
//! log, matching the extractor's resilience contract.

use crate::error::{IoResultExt, ModlintError, ModlintResult};
use crate::model::{
    ConfigurationName, DependencyDeclaration, LanguageKind, ModuleFlags, ModuleNode,
    ModulePath, Position, ProjectModel, SourceFile, SourceSetName,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Root of the host export document.
#[derive(Debug, Deserialize)]
pub struct ProjectSpec {
    pub modules: Vec<ModuleSpec>,
}

/// One module as exported by the host.
#[derive(Debug, Deserialize)]
pub struct ModuleSpec {
    pub path: String,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    /// Source-set name to a list of file or directory paths, relative to
    /// the export's root unless absolute.
    #[serde(default)]
    pub source_sets: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    pub flags: ModuleFlags,
}

/// One declared dependency edge as exported by the host.
#[derive(Debug, Deserialize)]
pub struct DependencySpec {
    pub configuration: String,
    pub target: String,
    #[serde(default)]
    pub position: Option<Position>,
}

/// Loads a project export from a JSON file. Relative source paths are
/// resolved against the file's directory.
pub fn load_project(path: &Path) -> ModlintResult<ProjectModel> {
    let content = fs::read_to_string(path).with_path(path)?;
    let spec: ProjectSpec = serde_json::from_str(&content)
        .map_err(|e| ModlintError::parse(path, e.to_string()))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    build_model(spec, root)
}

/// Materializes a model from an already-deserialized export.
pub fn build_model(spec: ProjectSpec, root: &Path) -> ModlintResult<ProjectModel> {
    let mut model = ProjectModel::new();
    for module_spec in spec.modules {
        let path = ModulePath::new(module_spec.path);
        if model.contains(&path) {
            return Err(ModlintError::model(format!(
                "duplicate module path '{path}'"
            )));
        }
        let mut node = ModuleNode::new(path);
        node.flags = module_spec.flags;
        for dep in module_spec.dependencies {
            node.declarations.push(DependencyDeclaration {
                configuration: ConfigurationName::new(dep.configuration),
                target: ModulePath::new(dep.target),
                position: dep.position,
            });
        }
        for (source_set, entries) in module_spec.source_sets {
            let files = collect_sources(root, &entries);
            node.source_sets
                .insert(SourceSetName::new(source_set), files);
        }
        model.add_module(node);
    }
    Ok(model)
}

/// Expands file/directory entries into a sorted list of recognized source
/// files.
fn collect_sources(root: &Path, entries: &[PathBuf]) -> Vec<SourceFile> {
    let mut files: Vec<SourceFile> = Vec::new();
    for entry in entries {
        let abs = if entry.is_absolute() {
            entry.clone()
        } else {
            root.join(entry)
        };
        if abs.is_file() {
            if let Some(kind) = LanguageKind::from_path(&abs) {
                files.push(SourceFile::new(abs, kind));
            }
            continue;
        }
        if !abs.is_dir() {
            // Generated source roots may not exist yet.
            debug!(path = %abs.display(), "source root missing, skipping");
            continue;
        }
        for walked in WalkDir::new(&abs).sort_by_file_name() {
            let walked = match walked {
                Ok(w) => w,
                Err(e) => {
                    debug!(path = %abs.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !walked.file_type().is_file() {
                continue;
            }
            if let Some(kind) = LanguageKind::from_path(walked.path()) {
                files.push(SourceFile::new(walked.path(), kind));
            }
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
