//! Must-be-api detection.
//!
//! A used main implementation-family declaration whose target is also
//! consumed by a direct dependent that never declares it. The target is
//! part of this module's effective public surface, so the declaration
//! should use the `api` variant.
//!
//! Disjoint with the overshot rule by construction: overshot covers
//! declarations the module does NOT use, this rule the ones it does.

use crate::finding::{Finding, FixAction, FixableEdge};
use crate::model::{ModuleNode, SourceSetName};
use crate::rules::{
    consumes_declarations, reaches_target, replay_failure, uses_target, Rule, RuleContext,
};

pub struct MustBeApiRule;

impl Rule for MustBeApiRule {
    fn id(&self) -> &'static str {
        "must-be-api"
    }

    fn description(&self) -> &'static str {
        "implementation declarations whose target leaks to downstream consumers"
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
            if !uses_target(&edges, &decl.target, &config_source_set) {
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
                            "{} is part of this module's public surface ({} consumes it); declare {}({}) instead of {}({})",
                            decl.target,
                            dependent.path,
                            recommended,
                            decl.target,
                            decl.configuration,
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
