//! Output formatting - plaintext and JSON.

use crate::runner::AnalysisReport;
use serde_json::json;

/// Renders a report in plain text format.
pub fn render_plain(report: &AnalysisReport) -> String {
    let mut out = String::new();
    if report.findings.is_empty() {
        out.push_str("No dependency findings.\n");
    } else {
        out.push_str(&format!("FINDINGS ({}):\n", report.findings.len()));
        for finding in &report.findings {
            out.push_str(&format!("- {}\n", finding));
        }
    }
    if !report.diagnostics.is_empty() {
        out.push_str(&format!(
            "\nPARSE DIAGNOSTICS ({}):\n",
            report.diagnostics.len()
        ));
        for diag in &report.diagnostics {
            out.push_str(&format!("- {}: {}\n", diag.path.display(), diag.message));
        }
    }
    if !report.degraded.is_empty() {
        out.push_str(&format!(
            "\nDEGRADED MODULES ({}):\n",
            report.degraded.len()
        ));
        for entry in &report.degraded {
            out.push_str(&format!(
                "- {} ({}): {}\n",
                entry.module, entry.rule, entry.message
            ));
        }
    }
    out
}

/// Prints a report in plain text format.
pub fn print_plain(report: &AnalysisReport) {
    print!("{}", render_plain(report));
}

/// Prints a report in JSON format.
///
/// Falls back to a minimal summary if serialization fails (should never
/// happen with these types, but every case is handled).
pub fn print_json(report: &AnalysisReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!(
                "{}",
                json!({
                    "findings": report.findings.len(),
                    "degraded": report.degraded.len(),
                })
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Finding;
    use crate::model::ModulePath;
    use crate::runner::DegradedModule;

    fn report_with(findings: Vec<Finding>, degraded: Vec<DegradedModule>) -> AnalysisReport {
        AnalysisReport {
            total_modules: 2,
            analyzed_modules: 2,
            findings,
            diagnostics: Vec::new(),
            degraded,
        }
    }

    #[test]
    fn test_plain_empty_report() {
        let text = render_plain(&report_with(Vec::new(), Vec::new()));
        assert_eq!(text, "No dependency findings.\n");
    }

    #[test]
    fn test_plain_lists_findings_and_degraded() {
        let finding = Finding::new(
            "unused-dependency",
            ModulePath::new(":app"),
            "declared dependency implementation(:lib) is never used",
        );
        let degraded = DegradedModule {
            module: ModulePath::new(":broken"),
            rule: "unused-dependency".into(),
            message: "cache failure".into(),
        };
        let text = render_plain(&report_with(vec![finding], vec![degraded]));
        assert!(text.contains("FINDINGS (1):"));
        assert!(text.contains(":app"));
        assert!(text.contains("DEGRADED MODULES (1):"));
        assert!(text.contains(":broken"));
    }
}
