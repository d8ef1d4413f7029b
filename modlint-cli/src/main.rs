//! modlint CLI - dependency-usage linter for multi-module project graphs.
//!
//! Features:
//! - Loads a build-system export (JSON) into an immutable project model
//! - Optional modlint.toml settings with fatal validation
//! - Rayon-powered parallel rule evaluation
//! - Plaintext or JSON reports, CI-friendly exit codes

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use modlint_core::{
    init_structured_logging, load_project, print_json, print_plain, Modlint, ModlintSettings,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Dependency-usage linter for multi-module project graphs")]
pub struct Cli {
    /// Path to the project export JSON
    #[arg(default_value = "project.json")]
    project: PathBuf,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Directory containing modlint.toml (defaults to the export's directory)
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Module path patterns to ignore (in addition to modlint.toml)
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,
}

/// Where to look for modlint.toml: an explicit override wins, otherwise
/// the directory the export lives in.
fn settings_root(project: &Path, override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => project
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    }
}

fn main() -> Result<()> {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] modlint internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Materialize the project model from the host export
    let model = load_project(&cli.project)
        .with_context(|| format!("Failed to load project export: {}", cli.project.display()))?;

    // 2. Load settings; malformed settings are fatal by contract
    let root = settings_root(&cli.project, cli.settings_dir.as_deref());
    let mut settings = match ModlintSettings::load(&root) {
        Ok(Some(settings)) => settings,
        Ok(None) => ModlintSettings::default(),
        Err(e) => {
            eprintln!("[ERROR] settings load failed: {}", e);
            std::process::exit(2);
        }
    };
    settings.ignore.extend(cli.ignore.iter().cloned());

    // 3. Run the pass; only settings validation can fail it
    let report = match Modlint::new(model).with_settings(settings).run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(2);
        }
    };

    // 4. Report results
    if cli.json {
        print_json(&report);
    } else {
        print_plain(&report);
    }

    // 5. Exit code (CI-friendly)
    std::process::exit(if report.has_findings() { 1 } else { 0 });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_settings_root_defaults_to_export_directory() {
        let root = settings_root(Path::new("/work/build/project.json"), None);
        assert_eq!(root, PathBuf::from("/work/build"));
    }

    #[test]
    fn test_settings_root_for_bare_file_name() {
        let root = settings_root(Path::new("project.json"), None);
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_settings_root_override_wins() {
        let root = settings_root(
            Path::new("/work/build/project.json"),
            Some(Path::new("/etc/modlint")),
        );
        assert_eq!(root, PathBuf::from("/etc/modlint"));
    }
}
