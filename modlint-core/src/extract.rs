//! Declaration and reference extraction - mission critical.
//!
//! Per source file, produces the set of declared top-level names and the
//! set of referenced external names. Fully lexical: a small set of
//! compiled regexes per language kind, no host compiler. Each file is
//! independent; no cross-module knowledge lives here.
//!
//! Extraction is resilient by contract: a file that cannot be read or
//! scanned yields empty sets plus a recorded [`ParseDiagnostic`], and
//! never aborts the batch.

use crate::error::{ModlintError, ModlintResult};
use crate::model::{LanguageKind, SourceFile};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum file size to scan (10 MB). Larger files are skipped with a
/// diagnostic to bound memory use.
const MAX_FILE_SIZE: u64 = 10_000_000;

/// Resource XML tags whose `name` attribute declares an `R.<type>.<name>`
/// entry in the producing module.
const RESOURCE_TAGS: &[&str] = &[
    "string", "color", "dimen", "bool", "integer", "array", "string-array", "integer-array",
    "style", "plurals", "attr", "declare-styleable",
];

/// Resource directories whose file stems declare an `R.<type>.<name>`
/// entry (e.g. `res/layout/home.xml` declares `R.layout.home`).
const RESOURCE_DIRS: &[&str] = &["layout", "drawable", "menu", "anim", "raw", "mipmap", "font"];

/// A non-fatal, per-file extraction failure, tagged with the file path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseDiagnostic {
    pub path: PathBuf,
    pub message: String,
}

impl ParseDiagnostic {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Extraction output of a single source file.
///
/// `extra_references` covers names usable without an explicit import:
/// same-package simple references, fully-qualified inline references,
/// and generated-resource (`R.type.name`) references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileExtraction {
    pub declarations: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    /// Package prefixes of `import a.b.*` statements, stored without the
    /// trailing `.*`.
    pub wildcard_imports: BTreeSet<String>,
    pub extra_references: BTreeSet<String>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl FileExtraction {
    /// A failed extraction: empty sets plus one recorded diagnostic.
    fn failed(diagnostic: ParseDiagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
            ..Self::default()
        }
    }
}

/// Compiled extraction rules, built once per pass and shared read-only by
/// all worker threads.
#[derive(Debug)]
pub struct Extractor {
    re_package: Regex,
    re_import: Regex,
    re_wildcard_import: Regex,
    re_kotlin_decl: Regex,
    re_java_decl: Regex,
    re_qualified_ref: Regex,
    re_simple_type: Regex,
    re_resource_ref: Regex,
    re_resource_decl: Regex,
    re_id_decl: Regex,
    re_xml_resource_ref: Regex,
}

impl Extractor {
    pub fn new() -> ModlintResult<Self> {
        let build = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ModlintError::Internal {
                message: format!("invalid extraction pattern: {e}"),
            })
        };

        Ok(Self {
            re_package: build(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_.]*)")?,
            re_import: build(
                r"(?m)^\s*import\s+(?:static\s+)?([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+)\s*(?:;|$|\s+as\s)",
            )?,
            re_wildcard_import: build(
                r"(?m)^\s*import\s+(?:static\s+)?([A-Za-z_][A-Za-z0-9_.]*)\.\*",
            )?,
            re_kotlin_decl: build(
                r"(?m)^(?:(?:public|private|internal|protected|abstract|final|open|sealed|data|inline|value|suspend|external|annotation|enum|inner|operator|infix|tailrec|const|actual|expect)\s+)*(?:class|interface|object|fun|val|var|typealias)\s+(?:<[^>\n]*>\s+)?([A-Za-z_][A-Za-z0-9_]*)",
            )?,
            re_java_decl: build(
                r"(?m)^(?:(?:public|private|protected|abstract|final|static|strictfp|sealed)\s+)*(?:class|interface|enum|record|@interface)\s+([A-Za-z_][A-Za-z0-9_]*)",
            )?,
            re_qualified_ref: build(r"\b((?:[a-z_][a-z0-9_]*\.)+[A-Z][A-Za-z0-9_]*)")?,
            re_simple_type: build(r"\b([A-Z][A-Za-z0-9_]*)\b")?,
            re_resource_ref: build(r"\bR\.([a-z][a-z-]*)\.([A-Za-z0-9_]+)")?,
            re_resource_decl: build(
                r#"<([a-z-]+)[^>]*?\sname\s*=\s*"([A-Za-z0-9_.]+)""#,
            )?,
            re_id_decl: build(r#"@\+id/([A-Za-z0-9_]+)"#)?,
            re_xml_resource_ref: build(
                r#"@(string|color|dimen|drawable|layout|style|menu|anim|id)/([A-Za-z0-9_.]+)"#,
            )?,
        })
    }

    /// Read and extract one source file. Read failures and oversized
    /// files yield empty sets plus a diagnostic.
    pub fn extract(&self, file: &SourceFile) -> FileExtraction {
        match fs::metadata(&file.path) {
            Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                return FileExtraction::failed(ParseDiagnostic::new(
                    &file.path,
                    format!("file exceeds {} bytes, skipped", MAX_FILE_SIZE),
                ));
            }
            Err(e) => {
                return FileExtraction::failed(ParseDiagnostic::new(
                    &file.path,
                    format!("unreadable: {e}"),
                ));
            }
            _ => {}
        }

        match fs::read_to_string(&file.path) {
            Ok(text) => self.extract_source(&file.path, file.kind, &text),
            Err(e) => FileExtraction::failed(ParseDiagnostic::new(
                &file.path,
                format!("read failed: {e}"),
            )),
        }
    }

    /// Extract from in-memory text. Pure; the unit the batch contract is
    /// built on.
    pub fn extract_source(&self, path: &Path, kind: LanguageKind, text: &str) -> FileExtraction {
        match kind {
            LanguageKind::Kotlin => self.extract_code(path, text, &self.re_kotlin_decl),
            LanguageKind::Java => self.extract_code(path, text, &self.re_java_decl),
            LanguageKind::Resource => self.extract_resource(path, text),
        }
    }

    fn extract_code(&self, path: &Path, text: &str, decl_re: &Regex) -> FileExtraction {
        let mut out = FileExtraction::default();
        let stripped = strip_comments(text);

        let package = self
            .re_package
            .captures(&stripped)
            .map(|c| c[1].to_string());

        for cap in self.re_wildcard_import.captures_iter(&stripped) {
            out.wildcard_imports.insert(cap[1].to_string());
        }
        for cap in self.re_import.captures_iter(&stripped) {
            out.imports.insert(cap[1].to_string());
        }

        // Top-level declarations become fully qualified with the file's
        // package, matching the names imports resolve against.
        let mut local_simple_names: BTreeSet<String> = BTreeSet::new();
        for cap in decl_re.captures_iter(&stripped) {
            let simple = cap[1].to_string();
            let qualified = match &package {
                Some(pkg) => format!("{pkg}.{simple}"),
                None => simple.clone(),
            };
            local_simple_names.insert(simple);
            out.declarations.insert(qualified);
        }

        // Generated-resource references: usable with no import at all.
        for cap in self.re_resource_ref.captures_iter(&stripped) {
            out.extra_references
                .insert(format!("R.{}.{}", &cap[1], &cap[2]));
        }

        // Fully-qualified inline references (`com.acme.db.Store` used
        // mid-expression without an import).
        for cap in self.re_qualified_ref.captures_iter(&stripped) {
            out.extra_references.insert(cap[1].to_string());
        }

        // Same-package references: capitalized identifiers that are
        // neither declared here nor covered by an explicit import resolve
        // against the file's own package first.
        if let Some(pkg) = &package {
            let imported_simple: BTreeSet<&str> = out
                .imports
                .iter()
                .filter_map(|i| i.rsplit('.').next())
                .collect();
            for cap in self.re_simple_type.captures_iter(&stripped) {
                let name = &cap[1];
                if name == "R"
                    || local_simple_names.contains(name)
                    || imported_simple.contains(name)
                {
                    continue;
                }
                out.extra_references.insert(format!("{pkg}.{name}"));
            }
        }

        if out.declarations.is_empty() && out.imports.is_empty() && package.is_none() {
            debug!(path = %path.display(), "no package or declarations extracted");
        }
        out
    }

    /// Declarative resource XML uses a dedicated rule set: every declared
    /// resource name becomes a declaration (`R.<type>.<name>`) in the
    /// producing module, and `@type/name` attributes become references.
    fn extract_resource(&self, path: &Path, text: &str) -> FileExtraction {
        let mut out = FileExtraction::default();

        for cap in self.re_resource_decl.captures_iter(text) {
            let tag = normalize_resource_tag(&cap[1]);
            if RESOURCE_TAGS.contains(&&cap[1]) {
                // R fields flatten dots in resource names to underscores.
                let name = cap[2].replace('.', "_");
                out.declarations.insert(format!("R.{tag}.{name}"));
            }
        }
        for cap in self.re_id_decl.captures_iter(text) {
            out.declarations.insert(format!("R.id.{}", &cap[1]));
        }
        for cap in self.re_xml_resource_ref.captures_iter(text) {
            let name = cap[2].replace('.', "_");
            out.extra_references
                .insert(format!("R.{}.{}", &cap[1], name));
        }

        // File-per-resource types: res/layout/home.xml declares R.layout.home.
        if let (Some(dir), Some(stem)) = (
            path.parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) {
            // Qualified directories like "layout-land" still feed R.layout.
            let base_dir = dir.split('-').next().unwrap_or(dir);
            if RESOURCE_DIRS.contains(&base_dir) {
                out.declarations.insert(format!("R.{base_dir}.{stem}"));
            }
        }

        out
    }
}

/// Map aggregate XML tags onto the R class field type they generate.
fn normalize_resource_tag(tag: &str) -> &str {
    match tag {
        "string-array" | "integer-array" => "array",
        "declare-styleable" => "styleable",
        other => other,
    }
}

/// Remove `//` line comments and `/* */` block comments so references in
/// commented-out code are not extracted. String literals containing
/// comment markers are a known lexical approximation.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for skipped in chars.by_ref() {
                        // Preserve line structure for anchored patterns.
                        if skipped == '\n' {
                            out.push('\n');
                        }
                        if prev == '*' && skipped == '/' {
                            break;
                        }
                        prev = skipped;
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new().unwrap()
    }

    #[test]
    fn test_kotlin_declarations_and_imports() {
        let src = r#"
package com.acme.settings

import com.acme.db.Store
import com.acme.network.*

class SettingsViewModel(private val store: Store)

fun topLevelHelper() = Unit
"#;
        let out = extractor().extract_source(
            Path::new("SettingsViewModel.kt"),
            LanguageKind::Kotlin,
            src,
        );
        assert!(out
            .declarations
            .contains("com.acme.settings.SettingsViewModel"));
        assert!(out.declarations.contains("com.acme.settings.topLevelHelper"));
        assert!(out.imports.contains("com.acme.db.Store"));
        assert!(out.wildcard_imports.contains("com.acme.network"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_kotlin_modifiers_and_enum_class() {
        let src = "package p\n\ninternal data class Payload(val x: Int)\nenum class Mode { A, B }\nsealed interface Event\n";
        let out = extractor().extract_source(Path::new("P.kt"), LanguageKind::Kotlin, src);
        assert!(out.declarations.contains("p.Payload"));
        assert!(out.declarations.contains("p.Mode"));
        assert!(out.declarations.contains("p.Event"));
    }

    #[test]
    fn test_java_declarations() {
        let src = "package com.acme.util;\n\nimport java.util.List;\n\npublic final class Strings {}\nrecord Pair(int a, int b) {}\n";
        let out = extractor().extract_source(Path::new("Strings.java"), LanguageKind::Java, src);
        assert!(out.declarations.contains("com.acme.util.Strings"));
        assert!(out.declarations.contains("com.acme.util.Pair"));
        assert!(out.imports.contains("java.util.List"));
    }

    #[test]
    fn test_import_alias_and_semicolon() {
        let src = "package p\nimport com.acme.db.Store as DataStore\n";
        let out = extractor().extract_source(Path::new("A.kt"), LanguageKind::Kotlin, src);
        assert!(out.imports.contains("com.acme.db.Store"));
    }

    #[test]
    fn test_wildcard_import_not_in_plain_imports() {
        let src = "package p\nimport com.acme.network.*\n";
        let out = extractor().extract_source(Path::new("A.kt"), LanguageKind::Kotlin, src);
        assert!(out.imports.is_empty());
        assert_eq!(
            out.wildcard_imports.iter().collect::<Vec<_>>(),
            vec!["com.acme.network"]
        );
    }

    #[test]
    fn test_extra_references() {
        let src = r#"
package com.acme.app

class Main {
    val direct = com.acme.db.Store()
    val title = R.string.app_name
    val local = Helper()
}
"#;
        let out = extractor().extract_source(Path::new("Main.kt"), LanguageKind::Kotlin, src);
        assert!(out.extra_references.contains("com.acme.db.Store"));
        assert!(out.extra_references.contains("R.string.app_name"));
        // Same-package fallback for the undeclared, unimported Helper.
        assert!(out.extra_references.contains("com.acme.app.Helper"));
    }

    #[test]
    fn test_commented_code_is_ignored() {
        let src = "package p\n// import com.acme.db.Store\n/*\nimport com.acme.network.Api\n*/\n";
        let out = extractor().extract_source(Path::new("A.kt"), LanguageKind::Kotlin, src);
        assert!(out.imports.is_empty());
    }

    #[test]
    fn test_resource_declarations() {
        let src = r#"<resources>
    <string name="app_name">Demo</string>
    <color name="accent">#FF0000</color>
    <style name="Theme.Demo" parent="@style/Theme.Material"/>
</resources>"#;
        let out = extractor().extract_source(
            Path::new("res/values/strings.xml"),
            LanguageKind::Resource,
            src,
        );
        assert!(out.declarations.contains("R.string.app_name"));
        assert!(out.declarations.contains("R.color.accent"));
        assert!(out.declarations.contains("R.style.Theme_Demo"));
        assert!(out.extra_references.contains("R.style.Theme_Material"));
    }

    #[test]
    fn test_layout_file_declares_by_stem_and_ids() {
        let src = r#"<LinearLayout android:id="@+id/root">
    <TextView android:id="@+id/title" android:text="@string/app_name"/>
</LinearLayout>"#;
        let out = extractor().extract_source(
            Path::new("res/layout/home.xml"),
            LanguageKind::Resource,
            src,
        );
        assert!(out.declarations.contains("R.layout.home"));
        assert!(out.declarations.contains("R.id.root"));
        assert!(out.declarations.contains("R.id.title"));
        assert!(out.extra_references.contains("R.string.app_name"));
    }

    #[test]
    fn test_unreadable_file_yields_diagnostic_not_error() {
        let missing = SourceFile::new("/definitely/not/here/Missing.kt", LanguageKind::Kotlin);
        let out = extractor().extract(&missing);
        assert!(out.declarations.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].path, missing.path);
    }
}
