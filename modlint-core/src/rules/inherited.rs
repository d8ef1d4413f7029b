//! Inherited dependency detection.
//!
//! A module that uses names from a target it never declares, reaching it
//! only through a transitive `api` chain of some direct dependency. The
//! build keeps working until the intermediate module drops or narrows its
//! edge, so the fix is to declare the target explicitly.
//!
//! The recommended configuration follows the witness source set: `test`
//! usage gets `testImplementation`, `main` usage gets `implementation`,
//! promoted to `api` when a direct dependent consumes the target too.

use crate::finding::{Finding, FixAction, FixableEdge};
use crate::model::{ConfigurationName, ModuleNode, ModulePath, SourceSetName};
use crate::rules::{consumes_declarations, replay_failure, Rule, RuleContext};
use std::collections::BTreeSet;

pub struct InheritedDependencyRule;

impl Rule for InheritedDependencyRule {
    fn id(&self) -> &'static str {
        "inherited-dependency"
    }

    fn description(&self) -> &'static str {
        "usage of modules reachable only through transitive api chains"
    }

    fn check(
        &self,
        ctx: &RuleContext<'_>,
        module: &ModuleNode,
    ) -> crate::error::ModlintResult<Vec<Finding>> {
        let mut findings = Vec::new();
        let edges = ctx.usage_edges(&module.path)?;

        // One finding per target; main witnesses take precedence so the
        // recommendation lands in the widest source set that needs it.
        let mut ordered: Vec<_> = edges.iter().collect();
        ordered.sort_by_key(|e| (!e.source_set.is_main(), e.source_set.clone(), e.target.clone()));
        let mut emitted: BTreeSet<&ModulePath> = BTreeSet::new();

        for edge in ordered {
            if emitted.contains(&edge.target) {
                continue;
            }
            if module.declares_dependency_on(&edge.target) {
                continue;
            }
            let classpath = ctx.graph.classpath(&module.path, &edge.source_set);
            let Some(entry) = classpath.iter().find(|e| e.target == &edge.target) else {
                continue;
            };
            if entry.is_direct() {
                continue;
            }

            let recommended = self.recommended_configuration(ctx, module, edge.target.clone(), &edge.source_set)?;
            findings.push(
                Finding::new(
                    self.id(),
                    module.path.clone(),
                    format!(
                        "uses {} ({}) but only inherits it through {}; declare {}({})",
                        edge.target,
                        edge.reference,
                        entry.via.target,
                        recommended,
                        edge.target,
                    ),
                )
                .with_position(entry.via.position.clone())
                .with_fix(FixableEdge {
                    module: module.path.clone(),
                    configuration: recommended,
                    target: edge.target.clone(),
                    action: FixAction::Add,
                }),
            );
            emitted.insert(&edge.target);
        }
        Ok(findings)
    }
}

impl InheritedDependencyRule {
    fn recommended_configuration(
        &self,
        ctx: &RuleContext<'_>,
        module: &ModuleNode,
        target: ModulePath,
        source_set: &SourceSetName,
    ) -> crate::error::ModlintResult<ConfigurationName> {
        if !source_set.is_main() {
            return Ok(ConfigurationName::new(format!(
                "{}Implementation",
                source_set.as_str()
            )));
        }
        let target_declarations = ctx
            .index
            .source_set(&target, &SourceSetName::main())
            .map_err(|e| replay_failure(target.as_str(), e))?;
        for dependent in ctx.graph.direct_dependents(&module.path) {
            if dependent.declares_dependency_on(&target) {
                continue;
            }
            if consumes_declarations(ctx, dependent, &target_declarations.declarations)? {
                return Ok(ConfigurationName::api());
            }
        }
        Ok(ConfigurationName::implementation())
    }
}
