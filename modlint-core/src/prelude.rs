//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use modlint_core::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for dependency analysis
//! without polluting the namespace with rarely-used items.

// Core analysis types
pub use crate::error::{ModlintError, ModlintResult};
pub use crate::model::{
    ConfigurationName, DependencyDeclaration, ModuleNode, ModulePath, ProjectModel,
    SourceSetName,
};

// Host adapter
pub use crate::host::load_project;

// Findings
pub use crate::finding::{Finding, FixAction, FixableEdge, Severity};

// Rules
pub use crate::rules::{default_rules, Rule, RuleContext};

// Runner API
pub use crate::runner::{AnalysisReport, Modlint};

// Settings
pub use crate::settings::ModlintSettings;

// Reporting
pub use crate::report::{print_json, print_plain};
