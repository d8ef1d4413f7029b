//! Redundant dependency detection.
//!
//! A declaration is redundant when its target is already reachable
//! through the transitive `api` closure of another declaration visible to
//! the same source set. The direct edge adds nothing and can be removed.

use crate::finding::{Finding, FixAction, FixableEdge};
use crate::model::ModuleNode;
use crate::rules::{Rule, RuleContext};

pub struct RedundantDependencyRule;

impl Rule for RedundantDependencyRule {
    fn id(&self) -> &'static str {
        "redundant-dependency"
    }

    fn description(&self) -> &'static str {
        "declarations whose target another declared api chain already provides"
    }

    fn check(
        &self,
        ctx: &RuleContext<'_>,
        module: &ModuleNode,
    ) -> crate::error::ModlintResult<Vec<Finding>> {
        let mut findings = Vec::new();

        for decl in &module.declarations {
            if decl.configuration.base().is_none() {
                continue;
            }
            if !ctx.model.contains(&decl.target) {
                continue;
            }
            let decl_source_set = decl.configuration.to_source_set_name();

            for other in &module.declarations {
                if other.target == decl.target {
                    continue;
                }
                if !ctx.model.contains(&other.target) {
                    continue;
                }
                // The providing chain must sit on the same classpath.
                if !decl_source_set.sees(&other.configuration.to_source_set_name()) {
                    continue;
                }
                if !ctx
                    .graph
                    .api_closure(&other.target)
                    .contains(decl.target.as_str())
                {
                    continue;
                }
                findings.push(
                    Finding::new(
                        self.id(),
                        module.path.clone(),
                        format!(
                            "{}({}) is redundant: {} already provides it through its api chain",
                            decl.configuration, decl.target, other.target
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
                break;
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_target_provided_by_api_chain() {
        let mut fx = crate::rules::testutil::Fixture::new("redundant_basic");
        fx.module(
            ":app",
            &[("implementation", ":lib"), ("implementation", ":core")],
            &[],
        );
        fx.module(":lib", &[("api", ":core")], &[]);
        fx.module(":core", &[], &[]);

        let findings = fx.check(&RedundantDependencyRule, ":app");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains(":core"));
        assert!(findings[0].message.contains(":lib"));
        assert_eq!(
            findings[0].fix.as_ref().unwrap().action,
            crate::finding::FixAction::Remove
        );
    }

    #[test]
    fn test_implementation_chains_do_not_provide() {
        let mut fx = crate::rules::testutil::Fixture::new("redundant_impl_chain");
        fx.module(
            ":app",
            &[("implementation", ":lib"), ("implementation", ":core")],
            &[],
        );
        fx.module(":lib", &[("implementation", ":core")], &[]);
        fx.module(":core", &[], &[]);

        assert!(fx.check(&RedundantDependencyRule, ":app").is_empty());
    }

    #[test]
    fn test_follows_deep_api_chains() {
        let mut fx = crate::rules::testutil::Fixture::new("redundant_deep");
        fx.module(
            ":app",
            &[("implementation", ":outer"), ("implementation", ":inner")],
            &[],
        );
        fx.module(":outer", &[("api", ":mid")], &[]);
        fx.module(":mid", &[("api", ":inner")], &[]);
        fx.module(":inner", &[], &[]);

        let findings = fx.check(&RedundantDependencyRule, ":app");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("implementation(:inner)"));
    }

    #[test]
    fn test_test_declaration_can_be_provided_by_main_chain() {
        // testImplementation(:core) sits on the test classpath together
        // with main's implementation(:lib), whose api chain provides :core.
        let mut fx = crate::rules::testutil::Fixture::new("redundant_cross_set");
        fx.module(
            ":app",
            &[("implementation", ":lib"), ("testImplementation", ":core")],
            &[],
        );
        fx.module(":lib", &[("api", ":core")], &[]);
        fx.module(":core", &[], &[]);

        let findings = fx.check(&RedundantDependencyRule, ":app");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("testImplementation(:core)"));
    }

    #[test]
    fn test_main_declaration_not_provided_by_test_chain() {
        let mut fx = crate::rules::testutil::Fixture::new("redundant_wrong_way");
        fx.module(
            ":app",
            &[("testImplementation", ":lib"), ("implementation", ":core")],
            &[],
        );
        fx.module(":lib", &[("api", ":core")], &[]);
        fx.module(":core", &[], &[]);

        assert!(fx.check(&RedundantDependencyRule, ":app").is_empty());
    }
}
