//! Settings loading and validation from modlint.toml.
//!
//! Malformed settings are the only fatal error class: validation runs
//! before classification and fails the whole pass, so a typo in an
//! exemption never silently disables a rule.

use crate::error::{IoResultExt, ModlintError, ModlintResult};
use crate::finding::Severity;
use crate::model::{ModulePath, ProjectModel};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A code-generator binding: dependencies on `target` are consumed only
/// by the named generator, so the unused rule must not flag them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CodeGeneratorBinding {
    pub name: String,
    /// Module path of the generator artifact inside the project.
    pub target: String,
}

/// Main configuration structure for modlint.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ModlintSettings {
    /// Module path patterns excluded from analysis. `*` is allowed as a
    /// leading or trailing wildcard (`:legacy-*`).
    pub ignore: Vec<String>,
    /// Per-rule enable/disable, keyed by kebab-case rule id. Rules
    /// default to enabled.
    pub checks: BTreeMap<String, bool>,
    /// Per-rule severity mapping. Rules default to `warning`.
    pub severity: BTreeMap<String, Severity>,
    /// Additional code-generator bindings for unused-rule exemptions.
    pub code_generators: Vec<CodeGeneratorBinding>,
}

impl ModlintSettings {
    /// Loads settings from `modlint.toml` under `root` if it exists.
    pub fn load(root: &Path) -> ModlintResult<Option<ModlintSettings>> {
        let path = root.join("modlint.toml");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).with_path(&path)?;
        let settings: ModlintSettings = toml::from_str(&content)
            .map_err(|e| ModlintError::settings(format!("invalid modlint.toml: {e}")))?;
        Ok(Some(settings))
    }

    /// Fatal validation against the concrete project model and the
    /// constructed rule set. Every referenced thing must exist: an
    /// exemption that matches nothing is a configuration error.
    pub fn validate(&self, model: &ProjectModel, known_rules: &[&str]) -> ModlintResult<()> {
        for pattern in &self.ignore {
            if pattern.is_empty() {
                return Err(ModlintError::settings("empty ignore pattern"));
            }
            if !model.modules().any(|m| matches_pattern(pattern, m.path.as_str())) {
                return Err(ModlintError::settings(format!(
                    "ignore pattern '{pattern}' matches no module"
                )));
            }
        }
        for rule in self.checks.keys().chain(self.severity.keys()) {
            if !known_rules.contains(&rule.as_str()) {
                return Err(ModlintError::settings(format!(
                    "unknown rule id '{rule}'"
                )));
            }
        }
        for binding in &self.code_generators {
            if binding.name.is_empty() {
                return Err(ModlintError::settings("code generator with empty name"));
            }
            let target = ModulePath::new(binding.target.as_str());
            if !model.contains(&target) {
                return Err(ModlintError::settings(format!(
                    "code generator '{}' targets unknown module '{}'",
                    binding.name, binding.target
                )));
            }
        }
        Ok(())
    }

    /// Whether `module` is excluded from analysis.
    pub fn is_ignored(&self, module: &ModulePath) -> bool {
        self.ignore
            .iter()
            .any(|p| matches_pattern(p, module.as_str()))
    }

    /// Whether a rule is enabled (default true).
    pub fn rule_enabled(&self, rule: &str) -> bool {
        self.checks.get(rule).copied().unwrap_or(true)
    }

    /// Severity for a rule (default warning).
    pub fn severity_for(&self, rule: &str) -> Severity {
        self.severity.get(rule).copied().unwrap_or_default()
    }

    /// Whether dependencies on `target` are exempt from the unused rule
    /// because a configured code generator consumes them.
    pub fn is_generator_target(&self, target: &ModulePath) -> bool {
        self.code_generators
            .iter()
            .any(|b| b.target == target.as_str())
    }
}

/// Simple glob matching: exact, leading `*`, or trailing `*`.
fn matches_pattern(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        path.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        path.ends_with(suffix)
    } else {
        pattern == path
    }
}
