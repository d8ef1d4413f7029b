//! Module source index: per-(module, source set) aggregation of
//! extractor output, memoized through the single-flight cache.
//!
//! Lazy by contract: a module whose declarations or references are never
//! queried by the resolver is never parsed. Parse diagnostics travel
//! inside the memoized value, so the cache stays the only shared mutable
//! structure in the engine.

use crate::cache::{SafeCache, SharedFailure};
use crate::error::ModlintResult;
use crate::extract::{Extractor, ParseDiagnostic};
use crate::model::{ModulePath, ProjectModel, SourceSetName};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Cache key: one source set of one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub module: ModulePath,
    pub source_set: SourceSetName,
}

/// The merged extraction output of every file in one source set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSetIndex {
    pub declarations: BTreeSet<String>,
    /// Exact references: explicit imports plus extra references
    /// (same-package, fully-qualified inline, generated-resource). All
    /// resolve by exact declaration match.
    pub references: BTreeSet<String>,
    /// Wildcard (package-level) references, matched by namespace prefix.
    pub wildcard_references: BTreeSet<String>,
    /// Per-file extraction failures, in file order.
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Lazily-computed declaration/reference sets for every module in the
/// project. Shared read-only across worker threads.
pub struct SourceIndex<'a> {
    model: &'a ProjectModel,
    extractor: Extractor,
    cache: SafeCache<IndexKey, Arc<SourceSetIndex>>,
}

impl<'a> SourceIndex<'a> {
    pub fn new(model: &'a ProjectModel) -> ModlintResult<Self> {
        Ok(Self {
            model,
            extractor: Extractor::new()?,
            cache: SafeCache::new(),
        })
    }

    /// The merged index of one source set. Computed at most once per key;
    /// concurrent requesters share the in-flight computation.
    pub fn source_set(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Result<Arc<SourceSetIndex>, SharedFailure> {
        let key = IndexKey {
            module: module.clone(),
            source_set: source_set.clone(),
        };
        self.cache.get_or_compute(key, || {
            debug!(module = %module, source_set = %source_set, "indexing source set");
            let mut index = SourceSetIndex::default();
            let files = self
                .model
                .module(module)
                .and_then(|m| m.source_sets.get(source_set));
            if let Some(files) = files {
                for file in files {
                    let extraction = self.extractor.extract(file);
                    index.declarations.extend(extraction.declarations);
                    index.references.extend(extraction.imports);
                    index.references.extend(extraction.extra_references);
                    index
                        .wildcard_references
                        .extend(extraction.wildcard_imports);
                    index.diagnostics.extend(extraction.diagnostics);
                }
            }
            Ok(Arc::new(index))
        })
    }

    /// Names declared by `(module, source_set)`.
    pub fn declarations(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Result<BTreeSet<String>, SharedFailure> {
        Ok(self.source_set(module, source_set)?.declarations.clone())
    }

    /// Names referenced by `(module, source_set)`, wildcards excluded.
    pub fn references(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Result<BTreeSet<String>, SharedFailure> {
        Ok(self.source_set(module, source_set)?.references.clone())
    }

    /// Parse diagnostics accumulated by every source set indexed so far.
    pub fn drain_diagnostics(&self) -> Vec<ParseDiagnostic> {
        let mut all: Vec<ParseDiagnostic> = self
            .cache
            .completed_values()
            .iter()
            .flat_map(|index| index.diagnostics.iter().cloned())
            .collect();
        all.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
        all
    }

    /// Number of (module, source set) keys indexed so far.
    pub fn indexed_count(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LanguageKind, ModuleNode, SourceFile};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("modlint_index_test")
            .join(format!("{}_{}", name, id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_source(dir: &PathBuf, name: &str, content: &str) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        SourceFile::new(path, LanguageKind::Kotlin)
    }

    fn single_module_model(files: Vec<SourceFile>) -> ProjectModel {
        let mut node = ModuleNode::new(ModulePath::new(":lib"));
        node.source_sets.insert(SourceSetName::main(), files);
        let mut model = ProjectModel::new();
        model.add_module(node);
        model
    }

    #[test]
    fn test_merges_files_of_one_source_set() {
        let dir = temp_dir("merge");
        let a = write_source(&dir, "A.kt", "package p\n\nclass Alpha\n");
        let b = write_source(
            &dir,
            "B.kt",
            "package p\n\nimport q.Beta\n\nclass Bravo\n",
        );
        let model = single_module_model(vec![a, b]);
        let index = SourceIndex::new(&model).unwrap();

        let decls = index
            .declarations(&ModulePath::new(":lib"), &SourceSetName::main())
            .unwrap();
        assert!(decls.contains("p.Alpha"));
        assert!(decls.contains("p.Bravo"));

        let refs = index
            .references(&ModulePath::new(":lib"), &SourceSetName::main())
            .unwrap();
        assert!(refs.contains("q.Beta"));
    }

    #[test]
    fn test_failed_file_contributes_diagnostic_not_failure() {
        let dir = temp_dir("diag");
        let ok = write_source(&dir, "Ok.kt", "package p\n\nclass Ok\n");
        let missing = SourceFile::new(dir.join("Gone.kt"), LanguageKind::Kotlin);
        let model = single_module_model(vec![ok, missing]);
        let index = SourceIndex::new(&model).unwrap();

        let set = index
            .source_set(&ModulePath::new(":lib"), &SourceSetName::main())
            .unwrap();
        assert!(set.declarations.contains("p.Ok"));
        assert_eq!(set.diagnostics.len(), 1);
        assert_eq!(index.drain_diagnostics().len(), 1);
    }

    #[test]
    fn test_unqueried_source_sets_are_never_indexed() {
        let dir = temp_dir("lazy");
        let a = write_source(&dir, "A.kt", "package p\n\nclass Alpha\n");
        let model = single_module_model(vec![a]);
        let index = SourceIndex::new(&model).unwrap();

        assert_eq!(index.indexed_count(), 0);
        index
            .source_set(&ModulePath::new(":lib"), &SourceSetName::main())
            .unwrap();
        assert_eq!(index.indexed_count(), 1);
    }

    #[test]
    fn test_missing_source_set_yields_empty_index() {
        let model = single_module_model(Vec::new());
        let index = SourceIndex::new(&model).unwrap();
        let set = index
            .source_set(&ModulePath::new(":lib"), &SourceSetName::test())
            .unwrap();
        assert!(set.declarations.is_empty());
        assert!(set.references.is_empty());
    }
}
