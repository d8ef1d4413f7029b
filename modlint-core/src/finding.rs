//! Finding types - the immutable output unit of the classification
//! engine.

use crate::model::{ConfigurationName, ModulePath, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a finding should be treated by the reporting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a fix tool should do with the edge carried by a finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixAction {
    /// Add the declaration (inherited dependencies).
    Add,
    /// Remove the declaration (unused, redundant dependencies).
    Remove,
    /// Replace the declaration's configuration with the carried one
    /// (must-be-api, overshot promotions).
    ChangeConfiguration,
}

/// Structured payload for tools that rewrite dependency declarations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixableEdge {
    pub module: ModulePath,
    /// For `Add`/`ChangeConfiguration` this is the recommended
    /// configuration; for `Remove` it is the existing one.
    pub configuration: ConfigurationName,
    pub target: ModulePath,
    pub action: FixAction,
}

/// One reported defect instance. Immutable snapshot; never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Kebab-case rule identifier, e.g. `unused-dependency`.
    pub rule: String,
    pub module: ModulePath,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixableEdge>,
}

impl Finding {
    pub fn new(
        rule: &str,
        module: ModulePath,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            module,
            message: message.into(),
            severity: Severity::default(),
            position: None,
            fix: None,
        }
    }

    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    pub fn with_fix(mut self, fix: FixableEdge) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Deterministic ordering key: module, then rule, then position,
    /// then message. Full-pass output is sorted with this so repeated
    /// runs over the same inputs are byte-identical.
    pub fn sort_key(&self) -> (ModulePath, String, Option<Position>, String) {
        (
            self.module.clone(),
            self.rule.clone(),
            self.position.clone(),
            self.message.clone(),
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] {} - {}",
            self.severity, self.rule, self.module, self.message
        )?;
        if let Some(pos) = &self.position {
            write!(f, " ({}:{}:{})", pos.file.display(), pos.line, pos.column)?;
        }
        Ok(())
    }
}
