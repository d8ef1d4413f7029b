//! Builder pattern API for a full analysis pass.
//!
//! ```rust,ignore
//! use modlint_core::prelude::*;
//!
//! let report = Modlint::new(model)
//!     .with_settings(settings)
//!     .run()?;
//!
//! for finding in &report.findings {
//!     println!("{finding}");
//! }
//! ```
//!
//! One pass builds the dependency graph, a lazy source index, and a
//! memoized resolver, then evaluates every enabled rule against every
//! non-ignored module on a rayon worker pool. A rule failure degrades the
//! affected module and never blocks the rest of the pass; the only fatal
//! error class is malformed settings, rejected before any work starts.

use crate::error::ModlintResult;
use crate::extract::ParseDiagnostic;
use crate::finding::Finding;
use crate::graph::DependencyGraph;
use crate::index::SourceIndex;
use crate::model::{ModuleNode, ModulePath, ProjectModel};
use crate::resolve::Resolver;
use crate::rules::{default_rules, Rule, RuleContext};
use crate::settings::ModlintSettings;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Builder for configuring and running one analysis pass.
pub struct Modlint {
    model: ProjectModel,
    settings: ModlintSettings,
    rules: Vec<Box<dyn Rule>>,
}

impl Modlint {
    /// Create an analysis builder over a materialized project model, with
    /// default settings and the full rule set.
    pub fn new(model: ProjectModel) -> Self {
        Self {
            model,
            settings: ModlintSettings::default(),
            rules: default_rules(),
        }
    }

    pub fn with_settings(mut self, settings: ModlintSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the rule set. Mostly useful for embedding hosts that ship
    /// extra rules.
    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Run the pass and return the collected report.
    ///
    /// Output ordering is deterministic: findings sort by
    /// (module, rule, position, message), degraded entries by module and
    /// rule, diagnostics by path. Two runs over identical inputs produce
    /// identical reports.
    pub fn run(&self) -> ModlintResult<AnalysisReport> {
        let rule_ids: Vec<&str> = self.rules.iter().map(|r| r.id()).collect();
        self.settings.validate(&self.model, &rule_ids)?;

        let graph = DependencyGraph::build(&self.model);
        let index = SourceIndex::new(&self.model)?;
        let resolver = Resolver::new(&graph, &index);
        let ctx = RuleContext {
            model: &self.model,
            graph: &graph,
            index: &index,
            resolver: &resolver,
            settings: &self.settings,
        };

        let enabled: Vec<&dyn Rule> = self
            .rules
            .iter()
            .filter(|r| self.settings.rule_enabled(r.id()))
            .map(AsRef::as_ref)
            .collect();
        let targets: Vec<&ModuleNode> = self
            .model
            .modules()
            .filter(|m| !self.settings.is_ignored(&m.path))
            .collect();
        debug!(
            modules = targets.len(),
            rules = enabled.len(),
            "starting analysis pass"
        );

        let per_module: Vec<(Vec<Finding>, Vec<DegradedModule>)> = targets
            .par_iter()
            .map(|module| self.check_module(&ctx, &enabled, module))
            .collect();

        let mut findings: Vec<Finding> = Vec::new();
        let mut degraded: Vec<DegradedModule> = Vec::new();
        for (f, d) in per_module {
            findings.extend(f);
            degraded.extend(d);
        }
        findings.sort_by_key(Finding::sort_key);
        degraded.sort_by(|a, b| a.module.cmp(&b.module).then_with(|| a.rule.cmp(&b.rule)));
        let diagnostics = index.drain_diagnostics();

        info!(
            findings = findings.len(),
            degraded = degraded.len(),
            diagnostics = diagnostics.len(),
            "analysis pass complete"
        );
        Ok(AnalysisReport {
            total_modules: self.model.len(),
            analyzed_modules: targets.len(),
            findings,
            diagnostics,
            degraded,
        })
    }

    fn check_module(
        &self,
        ctx: &RuleContext<'_>,
        rules: &[&dyn Rule],
        module: &ModuleNode,
    ) -> (Vec<Finding>, Vec<DegradedModule>) {
        let mut findings = Vec::new();
        let mut degraded = Vec::new();
        for rule in rules {
            match rule.check(ctx, module) {
                Ok(batch) => {
                    let severity = self.settings.severity_for(rule.id());
                    findings.extend(batch.into_iter().map(|f| f.with_severity(severity)));
                }
                Err(e) => {
                    warn!(
                        module = %module.path,
                        rule = rule.id(),
                        error = %e,
                        "rule failed; module results degraded"
                    );
                    degraded.push(DegradedModule {
                        module: module.path.clone(),
                        rule: rule.id().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        (findings, degraded)
    }
}

/// A module whose results are incomplete because a rule failed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedModule {
    pub module: ModulePath,
    pub rule: String,
    pub message: String,
}

/// Result of one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Modules in the project model.
    pub total_modules: usize,
    /// Modules actually analyzed (ignored ones excluded).
    pub analyzed_modules: usize,
    /// All findings, deterministically sorted.
    pub findings: Vec<Finding>,
    /// Per-file extraction failures encountered while indexing.
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Modules with incomplete results.
    pub degraded: Vec<DegradedModule>,
}

impl AnalysisReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Whether any finding carries error severity.
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == crate::finding::Severity::Error)
    }

    /// Findings produced for one module.
    pub fn findings_for(&self, module: &ModulePath) -> Vec<&Finding> {
        self.findings.iter().filter(|f| &f.module == module).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use crate::rules::testutil::Fixture;

    fn unused_pair(name: &str) -> Fixture {
        let mut fx = Fixture::new(name);
        fx.module(
            ":app",
            &[("implementation", ":lib-a")],
            &[("main", "App.kt", "package com.acme.app\n\nclass App\n")],
        );
        fx.module(
            ":lib-a",
            &[],
            &[("main", "Widget.kt", "package com.acme.lib\n\nclass Widget\n")],
        );
        fx
    }

    #[test]
    fn test_full_pass_reports_unused_dependency() {
        let fx = unused_pair("runner_basic");
        let report = Modlint::new(fx.model.clone()).run().unwrap();

        assert_eq!(report.total_modules, 2);
        assert_eq!(report.analyzed_modules, 2);
        let rules: Vec<&str> = report.findings.iter().map(|f| f.rule.as_str()).collect();
        assert!(rules.contains(&"unused-dependency"));
        assert!(report.degraded.is_empty());
    }

    #[test]
    fn test_disabled_rule_produces_no_findings() {
        let mut fx = unused_pair("runner_disabled");
        fx.settings.checks.insert("unused-dependency".into(), false);
        let report = Modlint::new(fx.model.clone())
            .with_settings(fx.settings.clone())
            .run()
            .unwrap();

        assert!(report
            .findings
            .iter()
            .all(|f| f.rule != "unused-dependency"));
    }

    #[test]
    fn test_ignored_module_is_skipped() {
        let mut fx = unused_pair("runner_ignored");
        fx.settings.ignore.push(":app".into());
        let report = Modlint::new(fx.model.clone())
            .with_settings(fx.settings.clone())
            .run()
            .unwrap();

        assert_eq!(report.analyzed_modules, 1);
        assert!(report
            .findings_for(&crate::model::ModulePath::new(":app"))
            .is_empty());
    }

    #[test]
    fn test_malformed_settings_fail_the_pass() {
        let mut fx = unused_pair("runner_badsettings");
        fx.settings.checks.insert("no-such-rule".into(), true);
        let err = Modlint::new(fx.model.clone())
            .with_settings(fx.settings.clone())
            .run()
            .unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_severity_override_is_applied() {
        let mut fx = unused_pair("runner_severity");
        fx.settings
            .severity
            .insert("unused-dependency".into(), Severity::Error);
        let report = Modlint::new(fx.model.clone())
            .with_settings(fx.settings.clone())
            .run()
            .unwrap();

        assert!(report.has_errors());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let fx = unused_pair("runner_determinism");
        let first = Modlint::new(fx.model.clone()).run().unwrap();
        let second = Modlint::new(fx.model.clone()).run().unwrap();
        assert_eq!(first.findings, second.findings);
        assert_eq!(
            serde_json::to_string(&first.findings).unwrap(),
            serde_json::to_string(&second.findings).unwrap()
        );
    }
}
