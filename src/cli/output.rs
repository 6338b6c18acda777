//! Output formatting for CLI commands.

use std::fmt::Write;

use serde::Serialize;

use crate::agent::ResearchReport;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    #[default]
    Json,
}

impl OutputFormat {
    /// Parses a format name, falling back to JSON for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" | "plain" => Self::Text,
            _ => Self::Json,
        }
    }

    /// Serializes `value` as pretty JSON followed by a newline.
    #[must_use]
    pub fn to_json<T: Serialize>(self, value: &T) -> String {
        serde_json::to_string_pretty(value).map_or_else(
            |e| format!("{{\"error\": \"serialization failed: {e}\"}}\n"),
            |s| s + "\n",
        )
    }
}

/// Renders a report as text: the answer, then a numbered source list.
#[must_use]
pub fn format_report_text(report: &ResearchReport, verbose: bool) -> String {
    let mut output = format!("{}\n", report.answer);

    if !report.citations.is_empty() {
        output.push_str("\nSources:\n");
        for citation in &report.citations {
            let _ = writeln!(output, "  [{}] {} - {}", citation.id, citation.title, citation.url);
        }
    }

    if verbose {
        let _ = write!(
            output,
            "\n---\nRounds: {} | Documents: {} | Citations: {} | Time: {:.1}s\n",
            report.search_rounds,
            report.documents_collected,
            report.citations.len(),
            report.elapsed.as_secs_f64()
        );
        for err in &report.errors {
            let _ = writeln!(output, "Error: {err}");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Citation, ErrorKind, ErrorRecord, Step};
    use std::time::Duration;

    fn report() -> ResearchReport {
        ResearchReport {
            answer: "Paris is the capital of France.[1]".to_string(),
            citations: vec![Citation {
                id: 1,
                url: "https://en.wikipedia.org/wiki/Paris".to_string(),
                title: "Paris - Wikipedia".to_string(),
            }],
            need_more: false,
            loop_count: 1,
            search_rounds: 1,
            documents_collected: 2,
            errors: Vec::new(),
            elapsed: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Json);
    }

    #[test]
    fn test_to_json_ends_with_newline() {
        let out = OutputFormat::Json.to_json(&serde_json::json!({"a": 1}));
        assert!(out.ends_with('\n'));
        assert!(out.contains("\"a\": 1"));
    }

    #[test]
    fn test_format_report_text_lists_sources() {
        let text = format_report_text(&report(), false);
        assert!(text.starts_with("Paris is the capital of France.[1]\n"));
        assert!(text.contains("[1] Paris - Wikipedia - https://en.wikipedia.org/wiki/Paris"));
        assert!(!text.contains("Rounds:"));
    }

    #[test]
    fn test_format_report_text_verbose() {
        let mut report = report();
        report.errors.push(ErrorRecord {
            step: Step::Reflect,
            kind: ErrorKind::Timeout,
            message: "slow".to_string(),
        });
        let text = format_report_text(&report, true);
        assert!(text.contains("Rounds: 1 | Documents: 2 | Citations: 1"));
        assert!(text.contains("Error: [reflect] Timeout: slow"));
    }
}
