//! Error adapter for converting ArchgraphError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Malformed
//! workspace documents are reported with a label at the position the JSON
//! parser stopped.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use archgraph::ArchgraphError;

/// Adapter for a workspace document that failed to deserialize.
pub struct DiagnosticAdapter<'a> {
    /// The JSON error
    err: &'a serde_json::Error,
    /// Source text for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    /// The byte span of the position reported by the parser, if any.
    fn span(&self) -> Option<SourceSpan> {
        if self.err.line() == 0 {
            return None;
        }
        let offset = byte_offset(self.src, self.err.line(), self.err.column());
        let len = usize::from(offset < self.src.len());
        Some(SourceSpan::new(offset.into(), len))
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid workspace document: {}", self.err)
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("archgraph::document"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.err.classify() {
            Category::Eof => "the document ends before it is complete",
            Category::Syntax => "the document is not valid JSON",
            Category::Data => "a field has the wrong type or a required field is missing",
            Category::Io => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span()?;
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`ArchgraphError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a ArchgraphError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ArchgraphError::Io(_) => "archgraph::io",
            ArchgraphError::Document { .. } => "archgraph::document",
            ArchgraphError::Model(_) => "archgraph::model",
            ArchgraphError::View(_) => "archgraph::view",
            ArchgraphError::Config(_) => "archgraph::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A malformed document with a source location.
    Diagnostic(DiagnosticAdapter<'a>),
    /// An error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a 1-based line and column into a byte offset into `src`.
fn byte_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Convert an [`ArchgraphError`] into a list of reportable errors.
pub fn to_reportables(err: &ArchgraphError) -> Vec<Reportable<'_>> {
    match err {
        ArchgraphError::Document { err, src } => {
            vec![Reportable::Diagnostic(DiagnosticAdapter::new(err, src))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use archgraph::{ModelError, Workspace, identifier::ElementId};

    use super::*;

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("ab\ncd", 1, 1), 0);
        assert_eq!(byte_offset("ab\ncd", 2, 2), 4);
        assert_eq!(byte_offset("ab\ncd", 9, 9), 5);
    }

    #[test]
    fn test_document_error_is_labeled() {
        let err = Workspace::from_json("{\n  \"name\": 3\n}").unwrap_err();

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.code().unwrap().to_string(), "archgraph::document");
                let labels: Vec<_> = d.labels().unwrap().collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                assert!(labels[0].offset() > 2);
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_model_error_code() {
        let err = ArchgraphError::Model(ModelError::UnknownElement(ElementId::new("7")));

        let reportables = to_reportables(&err);

        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.code().unwrap().to_string(), "archgraph::model");
                assert_eq!(e.to_string(), err.to_string());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }
}
