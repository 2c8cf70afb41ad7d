use std::io::Write;
use std::path::Path;

use anthology_store::{BatchReport, RepairSummary};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the outcome of a `normalize` run.
pub fn print_batch_summary(
    w: &mut dyn Write,
    venue: &str,
    year: &str,
    report: &BatchReport,
    path: Option<&Path>,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "{venue} {year}: {} raw records", report.total)?;

    if color.enabled() {
        writeln!(w, "  {} {}", "Normalized:".bold(), report.normalized.green())?;
    } else {
        writeln!(w, "  Normalized: {}", report.normalized)?;
    }

    if report.suffixed > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Suffixed keys:".bold(), report.suffixed.yellow())?;
        } else {
            writeln!(w, "  Suffixed keys: {}", report.suffixed)?;
        }
    }

    if report.failed() > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Failed:".bold(), report.failed().red())?;
        } else {
            writeln!(w, "  Failed: {}", report.failed())?;
        }
        for failure in &report.failures {
            let line = format!("    [{}] {}", failure.index, failure.error);
            if color.enabled() {
                writeln!(w, "{}", line.dimmed())?;
            } else {
                writeln!(w, "{line}")?;
            }
        }
    }

    if let Some(path) = path {
        writeln!(w, "  Wrote {}", path.display())?;
    }
    Ok(())
}

/// Print the totals of a `repair` run.
pub fn print_repair_summary(
    w: &mut dyn Write,
    dir: &Path,
    summary: &RepairSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Repaired {}", dir.display())?;
    writeln!(w, "  Files scanned: {}", summary.files)?;
    if color.enabled() && summary.files_changed > 0 {
        writeln!(w, "  Files changed: {}", summary.files_changed.yellow())?;
        writeln!(w, "  Papers changed: {}", summary.papers_changed.yellow())?;
    } else {
        writeln!(w, "  Files changed: {}", summary.files_changed)?;
        writeln!(w, "  Papers changed: {}", summary.papers_changed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthology_store::{BatchFailure, CoreError};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_batch_summary_plain() {
        let report = BatchReport {
            total: 3,
            normalized: 2,
            suffixed: 1,
            failures: vec![BatchFailure {
                index: 2,
                error: CoreError::MissingRequiredField {
                    missing: vec!["year".to_string()],
                    present: vec!["title".to_string()],
                },
            }],
        };
        let out = render(|w| {
            print_batch_summary(w, "icml", "2024", &report, Some(Path::new("out/icml-2024.json.gz")), ColorMode(false))
        });
        assert!(out.starts_with("icml 2024: 3 raw records\n"));
        assert!(out.contains("  Normalized: 2\n"));
        assert!(out.contains("  Suffixed keys: 1\n"));
        assert!(out.contains("  Failed: 1\n"));
        assert!(out.contains("    [2] paper missing required fields [\"year\"]"));
        assert!(out.ends_with("  Wrote out/icml-2024.json.gz\n"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_batch_summary_clean_run_omits_sections() {
        let report = BatchReport {
            total: 1,
            normalized: 1,
            ..Default::default()
        };
        let out = render(|w| print_batch_summary(w, "colt", "2020", &report, None, ColorMode(false)));
        assert!(!out.contains("Suffixed"));
        assert!(!out.contains("Failed"));
        assert!(!out.contains("Wrote"));
    }

    #[test]
    fn test_repair_summary_colored() {
        let summary = RepairSummary {
            files: 4,
            files_changed: 1,
            papers_changed: 3,
        };
        let out = render(|w| print_repair_summary(w, Path::new("data"), &summary, ColorMode(true)));
        assert!(out.contains("Files scanned: 4"));
        assert!(out.contains('\u{1b}'));
    }
}
