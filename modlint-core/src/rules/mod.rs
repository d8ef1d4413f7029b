//! Dependency classification rules.
//!
//! Each rule is a pure function of the project model plus resolved usage
//! edges, evaluated per module and concatenated. Rules never mutate
//! shared state, so they are safe to run in parallel, and a malformed
//! single edge is skipped with a debug log rather than failing the rule.
//!
//! The rule set is an explicit constructed list ([`default_rules`]), not
//! a process-wide registry.

pub mod inherited;
pub mod must_be_api;
pub mod overshot;
pub mod redundant;
pub mod sort;
pub mod unused;

use crate::cache::SharedFailure;
use crate::error::{ModlintError, ModlintResult};
use crate::finding::Finding;
use crate::graph::DependencyGraph;
use crate::index::SourceIndex;
use crate::model::{ModuleNode, ModulePath, ProjectModel, SourceSetName};
use crate::resolve::{Resolver, UsageEdge};
use crate::settings::ModlintSettings;

pub use inherited::InheritedDependencyRule;
pub use must_be_api::MustBeApiRule;
pub use overshot::OvershotDependencyRule;
pub use redundant::RedundantDependencyRule;
pub use sort::SortOrderRule;
pub use unused::UnusedDependencyRule;

/// Everything a rule may read while classifying one module. All fields
/// are read-only; the caches behind `index` and `resolver` are the only
/// synchronization points.
pub struct RuleContext<'a> {
    pub model: &'a ProjectModel,
    pub graph: &'a DependencyGraph<'a>,
    pub index: &'a SourceIndex<'a>,
    pub resolver: &'a Resolver<'a>,
    pub settings: &'a ModlintSettings,
}

impl RuleContext<'_> {
    /// Usage edges of `module`, with cache failures replayed as typed
    /// errors so the runner can mark the module degraded.
    pub fn usage_edges(
        &self,
        module: &ModulePath,
    ) -> ModlintResult<std::sync::Arc<Vec<UsageEdge>>> {
        self.resolver
            .usage_edges(module)
            .map_err(|e| replay_failure(module.as_str(), e))
    }
}

/// One finding-producing defect rule.
pub trait Rule: Send + Sync {
    /// Kebab-case rule identifier, stable across releases.
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Classify one module. Failures here degrade the module but never
    /// block findings for other modules.
    fn check(&self, ctx: &RuleContext<'_>, module: &ModuleNode) -> ModlintResult<Vec<Finding>>;
}

/// The full rule set, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(UnusedDependencyRule),
        Box::new(MustBeApiRule),
        Box::new(OvershotDependencyRule),
        Box::new(RedundantDependencyRule),
        Box::new(InheritedDependencyRule),
        Box::new(SortOrderRule),
    ]
}

/// Convert a shared cache failure into a per-module typed error.
pub(crate) fn replay_failure(key: &str, failure: SharedFailure) -> ModlintError {
    ModlintError::cache(key, failure.to_string())
}

/// Whether `edges` contains a usage of `target` from a source set that
/// can see dependencies declared for `config_source_set`.
pub(crate) fn uses_target(
    edges: &[UsageEdge],
    target: &ModulePath,
    config_source_set: &SourceSetName,
) -> bool {
    edges
        .iter()
        .any(|e| &e.target == target && e.source_set.sees(config_source_set))
}

/// Whether `dependent` already has `target` on a classpath of its own.
/// A dependent that reaches the target through its own declarations (a
/// direct edge is filtered before this point, so in practice a separate
/// `api` chain) does not need the module under analysis to promote
/// anything; its missing declaration is the inherited rule's business.
pub(crate) fn reaches_target(
    ctx: &RuleContext<'_>,
    dependent: &ModuleNode,
    target: &ModulePath,
) -> bool {
    let mut source_sets: Vec<SourceSetName> = dependent.source_sets.keys().cloned().collect();
    if !source_sets.iter().any(|s| s.is_main()) {
        source_sets.push(SourceSetName::main());
    }
    source_sets.iter().any(|ss| {
        ctx.graph
            .classpath(&dependent.path, ss)
            .iter()
            .any(|e| e.target == target)
    })
}

/// Whether any source set of `consumer` lexically references one of
/// `declarations`, by exact name or through a wildcard import.
///
/// This is deliberately independent of `consumer`'s own classpath: the
/// overshot and must-be-api rules need to know whether a downstream
/// module consumes names it can only be getting through the module under
/// analysis.
pub(crate) fn consumes_declarations(
    ctx: &RuleContext<'_>,
    consumer: &ModuleNode,
    declarations: &std::collections::BTreeSet<String>,
) -> ModlintResult<bool> {
    for source_set in consumer.source_sets.keys() {
        let idx = ctx
            .index
            .source_set(&consumer.path, source_set)
            .map_err(|e| replay_failure(consumer.path.as_str(), e))?;
        if idx.references.iter().any(|r| declarations.contains(r)) {
            return Ok(true);
        }
        for wildcard in &idx.wildcard_references {
            let prefix = format!("{wildcard}.");
            let hit = declarations.iter().any(|d| {
                d.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
            });
            if hit {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::model::{
        ConfigurationName, DependencyDeclaration, LanguageKind, ModuleFlags, ModuleNode,
        Position, SourceFile,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Builds a project model with on-disk sources and runs a single rule
    /// against one module.
    pub(crate) struct Fixture {
        dir: PathBuf,
        pub(crate) model: ProjectModel,
        pub(crate) settings: ModlintSettings,
    }

    impl Fixture {
        pub(crate) fn new(name: &str) -> Self {
            let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
            let dir = std::env::temp_dir()
                .join("modlint_rules_test")
                .join(format!("{}_{}", name, id));
            if dir.exists() {
                fs::remove_dir_all(&dir).ok();
            }
            fs::create_dir_all(&dir).unwrap();
            Self {
                dir,
                model: ProjectModel::new(),
                settings: ModlintSettings::default(),
            }
        }

        /// Adds a module. `sources` entries are (source set, file name,
        /// content); every declaration gets a position at its index.
        pub(crate) fn module(
            &mut self,
            path: &str,
            deps: &[(&str, &str)],
            sources: &[(&str, &str, &str)],
        ) {
            self.module_with_flags(path, deps, sources, ModuleFlags::default());
        }

        pub(crate) fn module_with_flags(
            &mut self,
            path: &str,
            deps: &[(&str, &str)],
            sources: &[(&str, &str, &str)],
            flags: ModuleFlags,
        ) {
            let module_dir = self.dir.join(path.replace(':', "_"));
            let mut node = ModuleNode::new(ModulePath::new(path));
            node.flags = flags;
            for (i, (config, target)) in deps.iter().enumerate() {
                node.declarations.push(DependencyDeclaration {
                    configuration: ConfigurationName::new(*config),
                    target: ModulePath::new(*target),
                    position: Some(Position {
                        file: module_dir.join("build.toml"),
                        line: i + 1,
                        column: 1,
                    }),
                });
            }
            for (source_set, file_name, content) in sources {
                let set_dir = module_dir.join(source_set);
                fs::create_dir_all(&set_dir).unwrap();
                let file_path = set_dir.join(file_name);
                fs::write(&file_path, content).unwrap();
                let kind =
                    LanguageKind::from_path(&file_path).unwrap_or(LanguageKind::Kotlin);
                node.source_sets
                    .entry(SourceSetName::new(*source_set))
                    .or_default()
                    .push(SourceFile::new(file_path, kind));
            }
            self.model.add_module(node);
        }

        pub(crate) fn check(&self, rule: &dyn Rule, module: &str) -> Vec<Finding> {
            let graph = DependencyGraph::build(&self.model);
            let index = SourceIndex::new(&self.model).unwrap();
            let resolver = Resolver::new(&graph, &index);
            let ctx = RuleContext {
                model: &self.model,
                graph: &graph,
                index: &index,
                resolver: &resolver,
                settings: &self.settings,
            };
            let node = self.model.module(&ModulePath::new(module)).unwrap();
            rule.check(&ctx, node).unwrap()
        }
    }
}
