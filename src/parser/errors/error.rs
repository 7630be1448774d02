//! Lexical diagnostic type
//!
//! Provides rich error information including:
//! - Error codes for categorization
//! - Severity levels
//! - Hints/suggestions for fixes
//! - File/line/column of the problem, or an explicit "unavailable"
//! - Related source locations

use std::fmt;

use crate::base::SourcePosition;

use super::codes::ErrorCode;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A hard error that ends the scan
    #[default]
    Error,
    /// A warning that doesn't stop scanning
    Warning,
    /// An informational hint
    Hint,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// Related location information for an error
///
/// Used to point at a second location, e.g. "here-doc started here" for a
/// missing end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// Description of this related location
    pub message: String,
    /// Source position
    pub position: SourcePosition,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// A lexical diagnostic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.format())]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Categorized error code
    pub code: ErrorCode,
    /// Error severity
    pub severity: Severity,
    /// Where the problem is, when known
    pub position: Option<SourcePosition>,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
    /// Related source locations
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    /// Create an error with the code's default message and no position
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_string(),
            code,
            severity: Severity::Error,
            position: None,
            hint: None,
            related: vec![],
        }
    }

    /// Create a builder for more complex error construction
    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder::new(code)
    }

    /// Add a hint to this error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a position
    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check if this error has a hint
    pub fn has_hint(&self) -> bool {
        self.hint.is_some()
    }

    /// Check if this error has related information
    pub fn has_related(&self) -> bool {
        !self.related.is_empty()
    }

    /// 1-based line, when a position is known
    pub fn line(&self) -> Option<usize> {
        self.position.as_ref().map(|p| p.line)
    }

    /// 1-based column, when a position is known
    pub fn column(&self) -> Option<usize> {
        self.position.as_ref().map(|p| p.column)
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = located(self.code, &self.message, self.position.as_ref());
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        for related in &self.related {
            result.push_str(&format!("\n  {}: {}", related.position, related.message));
        }
        result
    }
}

/// `file:line:column: Ecode: message`, or the message marked as unpositioned
pub fn located(code: impl fmt::Display, message: &str, position: Option<&SourcePosition>) -> String {
    match position {
        Some(pos) => format!("{pos}: {code}: {message}"),
        None => format!("{code}: {message} (position unavailable)"),
    }
}

/// Builder for creating complex syntax errors
pub struct SyntaxErrorBuilder {
    code: ErrorCode,
    message: Option<String>,
    position: Option<SourcePosition>,
    severity: Severity,
    hint: Option<String>,
    related: Vec<RelatedInfo>,
}

impl SyntaxErrorBuilder {
    /// Create a new builder with an error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            position: None,
            severity: Severity::Error,
            hint: None,
            related: vec![],
        }
    }

    /// Set the error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the source position
    pub fn at(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a hint
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Add related information
    pub fn related(mut self, message: impl Into<String>, position: SourcePosition) -> Self {
        self.related.push(RelatedInfo::new(message, position));
        self
    }

    /// Build the syntax error, falling back to the code's default message
    pub fn build(self) -> SyntaxError {
        SyntaxError {
            message: self
                .message
                .unwrap_or_else(|| self.code.default_message().to_string()),
            code: self.code,
            severity: self.severity,
            position: self.position,
            hint: self.hint,
            related: self.related,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
