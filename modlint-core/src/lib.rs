//! modlint-core: dependency-usage analysis for multi-module project graphs
//!
//! This library inspects a materialized module graph together with each
//! module's sources and reports dependency declaration defects: edges that
//! are declared but unused, too visible, redundant, missing, or out of
//! order.
//!
//! # Features
//!
//! - **Unused detection**: declared project dependencies nothing references
//! - **Overshot detection**: unused edges that downstream modules rely on
//! - **Must-be-api detection**: implementation edges that leak to consumers
//! - **Redundant detection**: edges already provided by declared api chains
//! - **Inherited detection**: usage of modules reachable only transitively
//! - **Sort-order checking**: canonical declaration order per configuration
//! - **Lazy indexing**: sources parse on demand, at most once per pass
//! - **Parallel evaluation**: modules are classified on a Rayon worker pool
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use modlint_core::prelude::*;
//!
//! let model = load_project(Path::new("project.json"))?;
//! let report = Modlint::new(model).run()?;
//!
//! for finding in &report.findings {
//!     println!("{finding}");
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: the read-only project graph types
//! - [`host`]: materializing a model from a build-system export
//! - [`extract`]: lexical declaration/reference extraction per file
//! - [`index`]: lazy per-source-set aggregation of extractions
//! - [`graph`]: classpath and api-closure queries over declared edges
//! - [`resolve`]: turning references into module-to-module usage edges
//! - [`cache`]: the single-flight memoization shared by index and resolver
//! - [`rules`]: the classification rules
//! - [`runner`]: the builder API driving one full pass
//! - [`settings`]: modlint.toml loading and fatal validation
//! - [`report`]: plaintext and JSON output
//! - [`error`]: typed error handling

pub mod cache;
pub mod error;
pub mod extract;
pub mod finding;
pub mod graph;
pub mod host;
pub mod index;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod runner;
pub mod settings;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, ModlintError, ModlintResult};

// Project model
pub use model::{
    BaseConfig, ConfigurationName, DependencyDeclaration, LanguageKind, ModuleFlags,
    ModuleNode, ModulePath, Position, ProjectModel, SourceFile, SourceSetName,
};

// Host adapter
pub use host::{build_model, load_project, DependencySpec, ModuleSpec, ProjectSpec};

// Extraction and indexing
pub use extract::{Extractor, FileExtraction, ParseDiagnostic};
pub use index::{IndexKey, SourceIndex, SourceSetIndex};

// Graph queries
pub use graph::{ClasspathEntry, DependencyGraph};

// Resolution
pub use resolve::{Resolver, UsageEdge};

// Caching
pub use cache::{SafeCache, SharedFailure};

// Findings
pub use finding::{Finding, FixAction, FixableEdge, Severity};

// Rules
pub use rules::{
    default_rules, InheritedDependencyRule, MustBeApiRule, OvershotDependencyRule,
    RedundantDependencyRule, Rule, RuleContext, SortOrderRule, UnusedDependencyRule,
};

// Runner API
pub use runner::{AnalysisReport, DegradedModule, Modlint};

// Settings
pub use settings::{CodeGeneratorBinding, ModlintSettings};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain, render_plain};
