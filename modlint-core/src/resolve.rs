//! Reference resolution: turning per-file reference names into
//! module-to-module usage edges.
//!
//! For every reference a module makes, the resolver searches the
//! module's full configuration-visible dependency set (direct plus
//! transitive `api`) for a module declaring a matching name. The nearest
//! candidate wins: fewest hops first, then declaration order, then
//! lexicographic module path - the documented deterministic tie-break.
//! Additional matches are logged at debug level as resolution ambiguity.
//!
//! A reference that resolves to no module is assumed external (a
//! non-project library) and ignored.

use crate::cache::{SafeCache, SharedFailure};
use crate::graph::{ClasspathEntry, DependencyGraph};
use crate::index::{SourceIndex, SourceSetIndex};
use crate::model::{ModulePath, SourceSetName};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Derived edge: `source`'s compiled output references at least one name
/// declared by `target`. One witness reference/declaration pair is kept
/// for traceability in finding messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEdge {
    pub source: ModulePath,
    pub target: ModulePath,
    /// The source set of `source` the witness reference lives in.
    pub source_set: SourceSetName,
    pub reference: String,
    pub declaration: String,
}

/// Memoized per-module usage-edge resolution.
pub struct Resolver<'a> {
    graph: &'a DependencyGraph<'a>,
    index: &'a SourceIndex<'a>,
    cache: SafeCache<ModulePath, Arc<Vec<UsageEdge>>>,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a DependencyGraph<'a>, index: &'a SourceIndex<'a>) -> Self {
        Self {
            graph,
            index,
            cache: SafeCache::new(),
        }
    }

    /// All usage edges leaving `module`, across its source sets.
    /// Computed at most once per module; the result order is
    /// deterministic for a fixed model and fixed source contents.
    pub fn usage_edges(&self, module: &ModulePath) -> Result<Arc<Vec<UsageEdge>>, SharedFailure> {
        self.cache.get_or_compute(module.clone(), || {
            let mut edges: Vec<UsageEdge> = Vec::new();
            let Some(node) = self.graph.model().module(module) else {
                return Ok(Arc::new(edges));
            };
            for source_set in node.source_sets.keys() {
                match self.resolve_source_set(module, source_set) {
                    Ok(mut resolved) => edges.append(&mut resolved),
                    Err(shared) => {
                        // Replay the underlying failure to our waiters.
                        return Err(crate::error::ModlintError::cache(
                            module.as_str(),
                            shared.to_string(),
                        ));
                    }
                }
            }
            Ok(Arc::new(edges))
        })
    }

    fn resolve_source_set(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Result<Vec<UsageEdge>, SharedFailure> {
        let own = self.index.source_set(module, source_set)?;
        let candidates = self.graph.classpath(module, source_set);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Consumers compile against a dependency's main output only.
        let main = SourceSetName::main();
        let mut candidate_indexes: Vec<(&ClasspathEntry<'_>, Arc<SourceSetIndex>)> =
            Vec::with_capacity(candidates.len());
        for entry in &candidates {
            let decls = self.index.source_set(entry.target, &main)?;
            candidate_indexes.push((entry, decls));
        }

        let mut edges: Vec<UsageEdge> = Vec::new();
        let mut claimed: HashSet<&ModulePath> = HashSet::new();

        for reference in &own.references {
            if own.declarations.contains(reference) {
                continue;
            }
            self.resolve_reference(
                module,
                source_set,
                reference,
                &candidate_indexes,
                |decls| {
                    decls
                        .declarations
                        .contains(reference)
                        .then(|| reference.clone())
                },
                &mut claimed,
                &mut edges,
            );
        }

        for wildcard in &own.wildcard_references {
            let prefix = format!("{wildcard}.");
            self.resolve_reference(
                module,
                source_set,
                wildcard,
                &candidate_indexes,
                |decls| {
                    decls
                        .declarations
                        .iter()
                        .find(|d| {
                            d.strip_prefix(&prefix)
                                .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
                        })
                        .cloned()
                },
                &mut claimed,
                &mut edges,
            );
        }

        Ok(edges)
    }

    /// Scan candidates nearest-first for a declaration matched by
    /// `matcher`; record an edge for the first hit per target module.
    #[allow(clippy::too_many_arguments)]
    fn resolve_reference<'c, F>(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
        reference: &str,
        candidates: &'c [(&ClasspathEntry<'a>, Arc<SourceSetIndex>)],
        matcher: F,
        claimed: &mut HashSet<&'c ModulePath>,
        edges: &mut Vec<UsageEdge>,
    ) where
        F: Fn(&SourceSetIndex) -> Option<String>,
    {
        let mut matched: Option<(&'c ModulePath, String)> = None;
        let mut extra_matches = 0usize;
        for (entry, decls) in candidates {
            if let Some(declaration) = matcher(decls) {
                if matched.is_none() {
                    matched = Some((entry.target, declaration));
                } else {
                    extra_matches += 1;
                }
            }
        }
        let Some((target, declaration)) = matched else {
            // External reference: not our concern.
            return;
        };
        if extra_matches > 0 {
            debug!(
                module = %module,
                reference,
                winner = %target,
                extra_matches,
                "ambiguous reference resolved to nearest candidate"
            );
        }
        if claimed.insert(target) {
            edges.push(UsageEdge {
                source: module.clone(),
                target: target.clone(),
                source_set: source_set.clone(),
                reference: reference.to_string(),
                declaration,
            });
        }
    }
}
