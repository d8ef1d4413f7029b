//! Declaration sort-order checking.
//!
//! Within one configuration, declarations are expected in
//! case-insensitive lexicographic order by target module path. Each
//! adjacent inversion produces one finding anchored at the later
//! declaration.

use crate::finding::Finding;
use crate::model::{ConfigurationName, DependencyDeclaration, ModuleNode};
use crate::rules::{Rule, RuleContext};
use std::collections::BTreeMap;

pub struct SortOrderRule;

impl Rule for SortOrderRule {
    fn id(&self) -> &'static str {
        "sort-order"
    }

    fn description(&self) -> &'static str {
        "dependency declarations out of canonical order within a configuration"
    }

    fn check(
        &self,
        _ctx: &RuleContext<'_>,
        module: &ModuleNode,
    ) -> crate::error::ModlintResult<Vec<Finding>> {
        let mut findings = Vec::new();

        let mut groups: BTreeMap<&ConfigurationName, Vec<&DependencyDeclaration>> =
            BTreeMap::new();
        for decl in &module.declarations {
            groups.entry(&decl.configuration).or_default().push(decl);
        }

        for (config, decls) in groups {
            for pair in decls.windows(2) {
                if pair[0].target.sort_key() <= pair[1].target.sort_key() {
                    continue;
                }
                findings.push(
                    Finding::new(
                        self.id(),
                        module.path.clone(),
                        format!(
                            "{}({}) should be declared before {}({})",
                            config, pair[1].target, config, pair[0].target
                        ),
                    )
                    .with_position(pair[1].position.clone()),
                );
            }
        }
        Ok(findings)
    }
}
