//! Unused dependency detection.
//!
//! A declaration is unused when no source set able to see its
//! configuration produces a usage edge to its target. Platform modules,
//! configured code-generator targets, and configurations outside the
//! known base set are exempt.

use crate::finding::{Finding, FixAction, FixableEdge};
use crate::model::ModuleNode;
use crate::rules::{uses_target, Rule, RuleContext};
use tracing::debug;

pub struct UnusedDependencyRule;

impl Rule for UnusedDependencyRule {
    fn id(&self) -> &'static str {
        "unused-dependency"
    }

    fn description(&self) -> &'static str {
        "declared project dependencies whose target contributes no referenced name"
    }

    fn check(
        &self,
        ctx: &RuleContext<'_>,
        module: &ModuleNode,
    ) -> crate::error::ModlintResult<Vec<Finding>> {
        let mut findings = Vec::new();
        let edges = ctx.usage_edges(&module.path)?;

        for decl in &module.declarations {
            if decl.configuration.base().is_none() {
                debug!(
                    module = %module.path,
                    configuration = %decl.configuration,
                    "skipping declaration with custom configuration"
                );
                continue;
            }
            // External coordinates are outside the project graph.
            let Some(target) = ctx.model.module(&decl.target) else {
                continue;
            };
            // Platform/BOM modules align versions, they never contribute
            // symbols.
            if target.flags.is_platform {
                continue;
            }
            if ctx.settings.is_generator_target(&decl.target) {
                continue;
            }
            // Compile-only inputs of a code-generating module are consumed
            // by its generator, not by its sources.
            if module.flags.has_code_generation
                && matches!(
                    decl.configuration.base(),
                    Some(crate::model::BaseConfig::CompileOnly)
                )
            {
                continue;
            }

            let config_source_set = decl.configuration.to_source_set_name();
            if uses_target(&edges, &decl.target, &config_source_set) {
                continue;
            }

            findings.push(
                Finding::new(
                    self.id(),
                    module.path.clone(),
                    format!(
                        "declared dependency {}({}) is never used",
                        decl.configuration, decl.target
                    ),
                )
                .with_position(decl.position.clone())
                .with_fix(FixableEdge {
                    module: module.path.clone(),
                    configuration: decl.configuration.clone(),
                    target: decl.target.clone(),
                    action: FixAction::Remove,
                }),
            );
        }
        Ok(findings)
    }
}
