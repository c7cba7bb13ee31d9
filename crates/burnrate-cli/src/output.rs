//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Steps 2-4 are resolved by `burnrate_core::config::resolve_config`.

use burnrate_core::error::ForecastError;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<18} {}", format!("{key}:"), value.as_ref())
}

/// Format a quantity with two decimals, dropping a negative zero.
pub fn fmt_quantity(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0.00".to_string()
    } else {
        format!("{rounded:.2}")
    }
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, aligned labels).
    Pretty,
    /// Plain tab-separated text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Parse a mode already normalized by config resolution.
    fn from_resolved(raw: &str) -> Option<Self> {
        match raw {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Pick the output mode: an explicit `--format` wins, then the mode
/// resolved from `--json`, `FORMAT`, user config and TTY detection.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, resolved: &str) -> OutputMode {
    format_flag
        .or_else(|| OutputMode::from_resolved(resolved))
        .unwrap_or(OutputMode::Text)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, mode, value, text_fn, pretty_fn)
}

/// Same as [`render_mode`], writing to `out`.
pub fn render_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

impl From<&ForecastError> for CliError {
    fn from(err: &ForecastError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Render an error to stderr, adapting format to the output mode.
///
/// In JSON mode, outputs `{"error": {"message": "...", "suggestion": "...", "error_code": "..."}}`.
/// In human modes, outputs `error[<code>]: <message>\n  suggestion: <suggestion>`.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnrate_core::model::{ReleaseId, TrackedQuantity};

    #[test]
    fn format_flag_wins() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Pretty), "json"),
            OutputMode::Pretty
        );
    }

    #[test]
    fn resolved_mode_is_used_without_flag() {
        assert_eq!(resolve_output_mode(None, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, "pretty"), OutputMode::Pretty);
        assert_eq!(resolve_output_mode(None, "text"), OutputMode::Text);
    }

    #[test]
    fn unknown_resolved_mode_falls_back_to_text() {
        assert_eq!(resolve_output_mode(None, "yaml"), OutputMode::Text);
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(fmt_quantity(4.0), "4.00");
        assert_eq!(fmt_quantity(-0.001), "0.00");
        assert_eq!(fmt_quantity(2.345_6), "2.35");
        assert_eq!(fmt_quantity(-12.5), "-12.50");
    }

    #[test]
    fn pretty_kv_aligns_labels() {
        let mut buf = Vec::new();
        pretty_kv(&mut buf, "Velocity", "4.00").unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("Velocity:"));
        assert!(s.trim_end().ends_with("4.00"));
    }

    #[test]
    fn render_to_json_is_pretty_printed() {
        let mut buf = Vec::new();
        render_to(
            &mut buf,
            OutputMode::Json,
            &serde_json::json!({"a": 1}),
            |_, _| Ok(()),
            |_, _| Ok(()),
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn render_to_dispatches_text_and_pretty() {
        let mut text = Vec::new();
        render_to(
            &mut text,
            OutputMode::Text,
            &1,
            |v, w| writeln!(w, "text {v}"),
            |v, w| writeln!(w, "pretty {v}"),
        )
        .unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "text 1\n");

        let mut pretty = Vec::new();
        render_to(
            &mut pretty,
            OutputMode::Pretty,
            &1,
            |v, w| writeln!(w, "text {v}"),
            |v, w| writeln!(w, "pretty {v}"),
        )
        .unwrap();
        assert_eq!(String::from_utf8(pretty).unwrap(), "pretty 1\n");
    }

    #[test]
    fn forecast_errors_carry_code_and_hint() {
        let err = ForecastError::ReleaseNotFound(ReleaseId::new("r9"));
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
        assert!(cli.message.contains("r9"));
        assert!(cli.suggestion.is_some());

        let err = ForecastError::UnsupportedQuantityKind(TrackedQuantity::ItemCount);
        assert_eq!(CliError::from(&err).error_code.as_deref(), Some("E2005"));
    }

    #[test]
    fn error_text_includes_code_and_suggestion() {
        let mut buf = Vec::new();
        let err = CliError::with_details("bad input", "try again", "E1002");
        write_error(&mut buf, OutputMode::Text, &err).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("error[E1002]: bad input"));
        assert!(s.contains("suggestion: try again"));
    }

    #[test]
    fn error_json_is_wrapped() {
        let mut buf = Vec::new();
        let err = CliError {
            message: "boom".to_string(),
            suggestion: None,
            error_code: None,
        };
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["error"]["message"], "boom");
        assert!(parsed["error"].get("suggestion").is_none());
    }
}
