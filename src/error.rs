//! Compilation and invocation error types.

use colored::Colorize;
use thiserror::Error;

/// Errors produced while compiling a template or invoking an artifact.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The metadata header failed structured parsing. Fatal: no partial
    /// metadata is ever kept.
    #[error("Metadata header parsing error")]
    MetadataParse(#[from] serde_yaml::Error),

    /// The template body failed to parse. Carries the failure offset so
    /// callers can point at the offending line.
    #[error("Template syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        /// Byte offset of the failure in the template body.
        offset: usize,
        /// 1-based line number.
        line: usize,
        /// 1-based column number (in characters).
        column: usize,
        /// The full text of the offending line.
        line_text: String,
    },

    /// A compiled artifact failed at invocation time.
    #[error("Artifact invocation error: {0}")]
    Invocation(#[from] InvocationError),
}

/// Runtime failures of a compiled artifact. These surface at the first
/// invocation, never at compile time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The body invokes a tag name with no rendering routine: either it
    /// was dropped at classification, or its alien token set is missing
    /// from the registry the evaluator was given.
    #[error("no rendering routine for tag `{0}`")]
    UnknownTag(String),

    /// A context variable could not be resolved in the merged
    /// metadata + caller context.
    #[error("unresolved name `{0}` in render context")]
    Undefined(String),
}

impl TemplateError {
    /// Build a [`TemplateError::Syntax`] from a byte offset into the
    /// template body, deriving line, column and the offending line text.
    pub fn syntax(message: impl Into<String>, offset: usize, source: &str) -> Self {
        let offset = offset.min(source.len());
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line = source[..offset].matches('\n').count() + 1;
        let column = source[line_start..offset].chars().count() + 1;

        Self::Syntax {
            message: message.into(),
            offset,
            line,
            column,
            line_text: source[line_start..line_end].to_string(),
        }
    }

    /// Render a caret diagnostic for a syntax error: the offending line
    /// followed by a `^` marker under the failure column.
    ///
    /// Returns `None` for non-syntax errors.
    pub fn caret_report(&self) -> Option<String> {
        let Self::Syntax {
            message,
            line,
            column,
            line_text,
            ..
        } = self
        else {
            return None;
        };

        let marker = " ".repeat(column.saturating_sub(1)) + "^";
        Some(format!(
            "{} {message}\n{line_text}\n{}\n  {} line {line}, column {column}",
            "Parsing the template failed:".yellow(),
            marker.red().bold(),
            "-->".dimmed(),
        ))
    }
}
