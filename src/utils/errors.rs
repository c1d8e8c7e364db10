//! Error types for the extractor.
//!
//! Every failure during extraction is terminal: the run aborts, no partial
//! model is returned, and emission never observes a half-built model. The
//! error kind classifies the rejected construct; the span (when the input
//! tree carries one) points at it.

use crate::utils::location::Span;
use std::fmt;
use thiserror::Error;

/// Error raised while extracting the polyhedral model from the input tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    /// The error message, naming the offending construct
    pub message: String,
    /// Location in source (if the tree node carried one)
    pub span: Option<Span>,
    /// The kind of extraction error
    pub kind: ExtractErrorKind,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(ref span) if !span.is_dummy() => {
                write!(f, "{}: {} at {}", self.kind, self.message, span)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Classification of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// Statement kind outside {assignment, loop, conditional, no-op},
    /// or a multi-target/tuple assignment
    UnsupportedStatement,
    /// Loop iteration source is not a range constructor with 1-2
    /// literal-or-name arguments
    UnsupportedLoopForm,
    /// Expression kind outside the supported affine subset
    UnsupportedExpression,
    /// A multiplication or other operation would produce a non-linear term
    NonAffineExpression,
    /// A subscript references a name that is not an active enclosing iterator
    UndefinedIterator,
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractErrorKind::UnsupportedStatement => "unsupported statement",
            ExtractErrorKind::UnsupportedLoopForm => "unsupported loop form",
            ExtractErrorKind::UnsupportedExpression => "unsupported expression",
            ExtractErrorKind::NonAffineExpression => "non-affine expression",
            ExtractErrorKind::UndefinedIterator => "undefined iterator",
        };
        write!(f, "{}", s)
    }
}

impl ExtractError {
    /// Create a new extraction error.
    pub fn new(kind: ExtractErrorKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    /// Statement kind outside the supported set.
    pub fn unsupported_statement(message: impl Into<String>, span: Span) -> Self {
        Self::new(ExtractErrorKind::UnsupportedStatement, message, Some(span))
    }

    /// Loop iteration source outside the supported range forms.
    pub fn unsupported_loop_form(message: impl Into<String>, span: Span) -> Self {
        Self::new(ExtractErrorKind::UnsupportedLoopForm, message, Some(span))
    }

    /// Expression kind outside the supported set.
    pub fn unsupported_expression(message: impl Into<String>, span: Span) -> Self {
        Self::new(ExtractErrorKind::UnsupportedExpression, message, Some(span))
    }

    /// Operation producing a non-linear term.
    pub fn non_affine(message: impl Into<String>, span: Span) -> Self {
        Self::new(ExtractErrorKind::NonAffineExpression, message, Some(span))
    }

    /// Subscript naming an inactive iterator.
    pub fn undefined_iterator(name: &str, span: Span) -> Self {
        Self::new(
            ExtractErrorKind::UndefinedIterator,
            format!("index `{}` is not defined in this scope", name),
            Some(span),
        )
    }
}

/// Result type using ExtractError.
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::unsupported_expression(
            "operator `/` is not affine-expressible",
            Span::new(2, 4, 2, 9),
        );
        let s = format!("{}", err);
        assert!(s.contains("unsupported expression"));
        assert!(s.contains("operator `/`"));
        assert!(s.contains("2:4-9"));
    }

    #[test]
    fn test_error_without_span() {
        let err = ExtractError::new(ExtractErrorKind::NonAffineExpression, "i * j", None);
        assert_eq!(format!("{}", err), "non-affine expression: i * j");
    }
}
