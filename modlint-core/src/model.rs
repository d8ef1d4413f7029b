//! Project graph model - the read-only input of one analysis pass.
//!
//! All of these types are materialized once from host build-system data
//! and never mutated while rules run. Derived state (source indexes,
//! resolved usage edges) lives in the pass-scoped caches instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Unique hierarchical identifier of a module inside the project graph,
/// e.g. `:feature:settings`.
///
/// Used as a map key everywhere, so it is cheap to clone and ordered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive ordering key, used for canonical declaration sorting.
    pub fn sort_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named source root within a module (`main`, `test`, `androidTest`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceSetName(String);

impl SourceSetName {
    pub const MAIN: &'static str = "main";
    pub const TEST: &'static str = "test";
    pub const ANDROID_TEST: &'static str = "androidTest";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    pub fn test() -> Self {
        Self::new(Self::TEST)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    /// Test-scoped source sets compile against the main output, so `main`
    /// is upstream of every non-main source set.
    pub fn upstream(&self) -> Vec<SourceSetName> {
        if self.is_main() {
            Vec::new()
        } else {
            vec![SourceSetName::main()]
        }
    }

    /// Whether code in this source set can see dependencies declared for
    /// `other`. A source set sees its own configurations plus everything
    /// declared for its upstream source sets.
    pub fn sees(&self, other: &SourceSetName) -> bool {
        self == other || self.upstream().contains(other)
    }
}

impl fmt::Display for SourceSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The base dependency bucket a configuration name resolves to, once its
/// source-set prefix is stripped (`testImplementation` -> `Implementation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseConfig {
    Api,
    Implementation,
    CompileOnly,
    RuntimeOnly,
}

impl BaseConfig {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Implementation => "implementation",
            Self::CompileOnly => "compileOnly",
            Self::RuntimeOnly => "runtimeOnly",
        }
    }
}

/// The unqualified name of a dependency configuration, like
/// `implementation` or `testApi`.
///
/// Aggregate names are `<sourceSet><BaseConfig>` with the `main` prefix
/// omitted, so `api` belongs to `main` and `testImplementation` to `test`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationName(String);

const BASE_CONFIGS: &[BaseConfig] = &[
    BaseConfig::Api,
    BaseConfig::Implementation,
    BaseConfig::CompileOnly,
    BaseConfig::RuntimeOnly,
];

impl ConfigurationName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn api() -> Self {
        Self::new("api")
    }

    pub fn implementation() -> Self {
        Self::new("implementation")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base bucket of this configuration, or `None` for names outside
    /// the closed set (custom configurations are skipped by rules).
    pub fn base(&self) -> Option<BaseConfig> {
        for base in BASE_CONFIGS {
            let suffix = base.suffix();
            if self.0 == suffix {
                return Some(*base);
            }
            // Aggregate form: "<prefix><Suffix>" with a capitalized suffix.
            let capitalized = capitalize(suffix);
            if let Some(prefix) = self.0.strip_suffix(&capitalized) {
                if !prefix.is_empty() {
                    return Some(*base);
                }
            }
        }
        None
    }

    /// The source set this configuration feeds. Main configurations omit
    /// the prefix entirely, so `implementation` maps to `main` while
    /// `testImplementation` maps to `test`.
    pub fn to_source_set_name(&self) -> SourceSetName {
        match self.base() {
            Some(base) => {
                let suffix = base.suffix();
                if self.0 == suffix {
                    SourceSetName::main()
                } else {
                    let capitalized = capitalize(suffix);
                    match self.0.strip_suffix(&capitalized) {
                        Some(prefix) if !prefix.is_empty() => SourceSetName::new(prefix),
                        _ => SourceSetName::main(),
                    }
                }
            }
            None => SourceSetName::main(),
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self.base(), Some(BaseConfig::Api))
    }

    /// Everything narrower than `api`: implementation, compileOnly,
    /// runtimeOnly, and their per-source-set variants.
    pub fn is_implementation_family(&self) -> bool {
        matches!(
            self.base(),
            Some(BaseConfig::Implementation | BaseConfig::CompileOnly | BaseConfig::RuntimeOnly)
        )
    }

    /// The `api` configuration for the same source set
    /// (`implementation` -> `api`, `debugImplementation` -> `debugApi`).
    pub fn api_variant(&self) -> ConfigurationName {
        let source_set = self.to_source_set_name();
        if source_set.is_main() {
            ConfigurationName::api()
        } else {
            ConfigurationName::new(format!("{}Api", source_set.as_str()))
        }
    }

    /// The `implementation` configuration for the same source set.
    pub fn implementation_variant(&self) -> ConfigurationName {
        let source_set = self.to_source_set_name();
        if source_set.is_main() {
            ConfigurationName::implementation()
        } else {
            ConfigurationName::new(format!("{}Implementation", source_set.as_str()))
        }
    }
}

impl fmt::Display for ConfigurationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Source position attached to declarations and findings (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

/// A declared dependency edge: "this module depends on `target` through
/// `configuration`". Supplied by the host model, immutable for the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub configuration: ConfigurationName,
    pub target: ModulePath,
    /// Where the declaration appears in the build file, when the host
    /// model knows it. Used for sort-order findings and fix payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Per-module flags needed for rule exemptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleFlags {
    /// Module runs annotation processing / code generation, so some of
    /// its declared dependencies are consumed only by a generator.
    pub has_code_generation: bool,
    /// Platform/BOM module: declared for version alignment, never for
    /// symbols, and therefore exempt from the unused rule.
    pub is_platform: bool,
}

/// Language kind of a source file, a closed set the extractor knows how
/// to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    Kotlin,
    Java,
    /// Declarative resource/manifest XML. Extracted with a dedicated rule
    /// set: declared resource names become declarations in the producing
    /// module and `R.<type>.<name>` reference patterns in consumers.
    Resource,
}

impl LanguageKind {
    /// Detect the language kind from a file extension, `None` for files
    /// the extractor does not understand.
    pub fn from_path(path: &Path) -> Option<LanguageKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("kt") | Some("kts") => Some(Self::Kotlin),
            Some("java") => Some(Self::Java),
            Some("xml") => Some(Self::Resource),
            _ => None,
        }
    }
}

/// One source file belonging to a module's source set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: LanguageKind,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, kind: LanguageKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// One module of the project graph: its declared dependency edges (in
/// build-file declaration order) and its source sets.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub path: ModulePath,
    /// Declared edges in declaration order. Order matters for the
    /// sort-order rule and for nearest-candidate tie-breaking.
    pub declarations: Vec<DependencyDeclaration>,
    pub source_sets: BTreeMap<SourceSetName, Vec<SourceFile>>,
    pub flags: ModuleFlags,
}

impl ModuleNode {
    pub fn new(path: ModulePath) -> Self {
        Self {
            path,
            declarations: Vec::new(),
            source_sets: BTreeMap::new(),
            flags: ModuleFlags::default(),
        }
    }

    /// Direct declarations on `target`, across all configurations.
    pub fn declarations_on(&self, target: &ModulePath) -> Vec<&DependencyDeclaration> {
        self.declarations
            .iter()
            .filter(|d| &d.target == target)
            .collect()
    }

    pub fn declares_dependency_on(&self, target: &ModulePath) -> bool {
        self.declarations.iter().any(|d| &d.target == target)
    }
}

/// The whole project graph for one analysis pass. Read-only once built;
/// safely shared across worker threads without locking.
#[derive(Debug, Clone, Default)]
pub struct ProjectModel {
    modules: BTreeMap<ModulePath, ModuleNode>,
}

impl ProjectModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: ModuleNode) {
        self.modules.insert(module.path.clone(), module);
    }

    pub fn module(&self, path: &ModulePath) -> Option<&ModuleNode> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &ModulePath) -> bool {
        self.modules.contains_key(path)
    }

    /// All modules in deterministic (path) order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
