//! Diagnostics produced while validating vine files.

use oxc_span::Span;
use serde::Serialize;
use vine_carton::{CompactString, LineIndex, SourceLocation};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// Which validation family raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Parse failures and disallowed top-level statements.
    Structural,
    /// Misused macros and malformed component functions.
    MacroUsage,
    /// References that would break once a macro argument is hoisted.
    Hoisting,
}

/// A single error or warning attributed to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VineDiagnostic {
    pub file_id: CompactString,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: SourceLocation,
}

impl VineDiagnostic {
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for VineDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[vine {}] {}:{}:{} {}",
            self.severity.as_str(),
            self.file_id,
            self.location.line,
            self.location.column,
            self.message
        )
    }
}

/// Collects diagnostics for one file, resolving spans to line/column as it goes.
#[derive(Debug)]
pub struct Diagnostics<'s> {
    file_id: CompactString,
    source: &'s str,
    line_index: LineIndex,
    items: Vec<VineDiagnostic>,
}

impl<'s> Diagnostics<'s> {
    pub fn new(file_id: &str, source: &'s str) -> Self {
        Self {
            file_id: CompactString::new(file_id),
            source,
            line_index: LineIndex::new(source),
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.push(Severity::Error, kind, message.into(), span);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.push(Severity::Warning, kind, message.into(), span);
    }

    fn push(&mut self, severity: Severity, kind: DiagnosticKind, message: String, span: Span) {
        let location = self.line_index.locate(self.source, span.start, span.end);
        tracing::trace!(file = %self.file_id, ?kind, line = location.line, "{message}");
        self.items.push(VineDiagnostic {
            file_id: self.file_id.clone(),
            severity,
            kind,
            message,
            location,
        });
    }

    /// Number of diagnostics collected so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    /// Errors raised after the first `mark` diagnostics.
    pub fn has_errors_since(&self, mark: usize) -> bool {
        self.items[mark.min(self.items.len())..]
            .iter()
            .any(VineDiagnostic::is_error)
    }

    /// Stable-sort the diagnostics raised after `mark` by source position.
    pub fn sort_since(&mut self, mark: usize) {
        let mark = mark.min(self.items.len());
        self.items[mark..].sort_by_key(|d| d.location.start);
    }

    pub fn iter(&self) -> impl Iterator<Item = &VineDiagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<VineDiagnostic> {
        self.items
    }
}
