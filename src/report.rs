/*!
 * Reporting functionality for treecopy
 *
 * Measures produced text and renders a summary of one extraction with the
 * tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{Diagnostic, EntryKind, TraversalResult};

/// Size measurements of a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Number of characters
    pub chars: usize,
    /// Number of lines
    pub lines: usize,
    /// Estimated LLM tokens (one per four characters)
    pub estimated_tokens: usize,
}

impl TextStats {
    /// Measure `text`; called with fresh clipboard text by pollers as well
    pub fn measure(text: &str) -> Self {
        let chars = text.chars().count();
        Self {
            chars,
            lines: text.lines().count(),
            estimated_tokens: chars / 4,
        }
    }
}

/// Summary of one extraction
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Where the output went
    pub destination: String,
    /// Time taken to walk and render
    pub duration: Duration,
    /// Directories visited
    pub directories: usize,
    /// Text files included
    pub text_files: usize,
    /// Binary files listed without content
    pub binary_files: usize,
    /// Files that could not be read
    pub unreadable_files: usize,
    /// Extensions seen
    pub file_types: Vec<String>,
    /// Measurements of the rendered output
    pub stats: TextStats,
    /// Recovered problems
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionReport {
    /// Summarize a walk and the text rendered from it
    pub fn from_traversal(
        result: &TraversalResult,
        output: &str,
        destination: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            destination: destination.into(),
            duration,
            directories: result.count(EntryKind::Directory),
            text_files: result.count(EntryKind::TextFile),
            binary_files: result.count(EntryKind::BinaryFile),
            unreadable_files: result.count(EntryKind::Unreadable),
            file_types: result.file_types.iter().cloned().collect(),
            stats: TextStats::measure(output),
            diagnostics: result.diagnostics.clone(),
        }
    }

    /// Summarize a compressed listing
    pub fn from_listing(output: &str, destination: impl Into<String>, duration: Duration) -> Self {
        Self {
            destination: destination.into(),
            duration,
            directories: 0,
            text_files: 0,
            binary_files: 0,
            unreadable_files: 0,
            file_types: Vec::new(),
            stats: TextStats::measure(output),
            diagnostics: Vec::new(),
        }
    }
}

/// Report generator for extraction results
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate the report as a string
    pub fn generate_report(&self, report: &ExtractionReport) -> String {
        let summary = self.create_summary_table(report);
        if report.diagnostics.is_empty() {
            return format!("✅  EXTRACTION COMPLETE\n{}", summary);
        }

        format!(
            "⚠️  SKIPPED ENTRIES\n{}\n\n✅  EXTRACTION COMPLETE\n{}",
            self.create_diagnostics_table(&report.diagnostics),
            summary
        )
    }

    /// Print the report to stderr, keeping stdout for the output itself
    pub fn print_report(&self, report: &ExtractionReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &ExtractionReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output".to_string(),
                value: report.destination.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
        ];

        let entries =
            report.directories + report.text_files + report.binary_files + report.unreadable_files;
        if entries > 0 {
            rows.push(SummaryRow {
                key: "📁 Directories".to_string(),
                value: self.format_number(report.directories),
            });
            rows.push(SummaryRow {
                key: "📄 Text Files".to_string(),
                value: self.format_number(report.text_files),
            });
            rows.push(SummaryRow {
                key: "🧱 Binary Files".to_string(),
                value: self.format_number(report.binary_files),
            });
            if report.unreadable_files > 0 {
                rows.push(SummaryRow {
                    key: "🚫 Unreadable Files".to_string(),
                    value: self.format_number(report.unreadable_files),
                });
            }
        }

        if !report.file_types.is_empty() {
            rows.push(SummaryRow {
                key: "🏷️ File Types".to_string(),
                value: report.file_types.join(", "),
            });
        }

        rows.push(SummaryRow {
            key: "📝 Lines".to_string(),
            value: self.format_number(report.stats.lines),
        });
        rows.push(SummaryRow {
            key: "🔤 Characters".to_string(),
            value: self.format_number(report.stats.chars),
        });
        rows.push(SummaryRow {
            key: "📦 LLM Tokens".to_string(),
            value: format!(
                "{} tokens (estimated)",
                self.format_number(report.stats.estimated_tokens)
            ),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_diagnostics_table(&self, diagnostics: &[Diagnostic]) -> String {
        #[derive(Tabled)]
        struct DiagnosticRow {
            #[tabled(rename = "Path")]
            path: String,

            #[tabled(rename = "Problem")]
            message: String,
        }

        let rows: Vec<DiagnosticRow> = diagnostics
            .iter()
            .map(|d| DiagnosticRow {
                path: d.path.display().to_string(),
                message: d.message.clone(),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }
}
