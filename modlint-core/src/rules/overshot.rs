//! Overshot dependency detection.
//!
//! A main implementation-family declaration the module itself never uses,
//! but whose target some direct dependent consumes lexically. Removing
//! the declaration would break the dependent, so the recommended fix is
//! promotion to the `api` variant rather than removal.

use crate::finding::{Finding, FixAction, FixableEdge};
use crate::model::{ModuleNode, SourceSetName};
use crate::rules::{
    consumes_declarations, reaches_target, replay_failure, uses_target, Rule, RuleContext,
};

pub struct OvershotDependencyRule;

impl Rule for OvershotDependencyRule {
    fn id(&self) -> &'static str {
        "overshot-dependency"
    }

    fn description(&self) -> &'static str {
        "unused declarations whose target is consumed by a direct dependent"
    }

    fn check(
        &self,
        ctx: &RuleContext<'_>,
        module: &ModuleNode,
    ) -> crate::error::ModlintResult<Vec<Finding>> {
        let mut findings = Vec::new();
        let edges = ctx.usage_edges(&module.path)?;
        let main = SourceSetName::main();

        for decl in &module.declarations {
            if !decl.configuration.is_implementation_family() {
                continue;
            }
            let config_source_set = decl.configuration.to_source_set_name();
            if !config_source_set.is_main() {
                continue;
            }
            if !ctx.model.contains(&decl.target) {
                continue;
            }
            if uses_target(&edges, &decl.target, &config_source_set) {
                continue;
            }

            let target_declarations = ctx
                .index
                .source_set(&decl.target, &main)
                .map_err(|e| replay_failure(decl.target.as_str(), e))?;

            for dependent in ctx.graph.direct_dependents(&module.path) {
                if dependent.declares_dependency_on(&decl.target) {
                    continue;
                }
                if reaches_target(ctx, dependent, &decl.target) {
                    continue;
                }
                if !consumes_declarations(ctx, dependent, &target_declarations.declarations)? {
                    continue;
                }
                let recommended = decl.configuration.api_variant();
                findings.push(
                    Finding::new(
                        self.id(),
                        module.path.clone(),
                        format!(
                            "{}({}) is unused here but {} consumes {} through this module; declare {}({}) instead",
                            decl.configuration,
                            decl.target,
                            dependent.path,
                            decl.target,
                            recommended,
                            decl.target,
                        ),
                    )
                    .with_position(decl.position.clone())
                    .with_fix(FixableEdge {
                        module: module.path.clone(),
                        configuration: recommended,
                        target: decl.target.clone(),
                        action: FixAction::ChangeConfiguration,
                    }),
                );
                break;
            }
        }
        Ok(findings)
    }
}
