//! Error types for verification and parsing.
//!
//! Two kinds of failure exist in this crate:
//!
//! - [`VerifyError`]: an attribute or operand set violates a structural
//!   invariant. Raised synchronously at construction/verification time.
//!   Tests assert on the literal message text, so messages are part of the
//!   contract.
//! - [`ParseError`]: the token stream does not match the grammar at the
//!   current position. Always carries a span.
//!
//! A `VerifyError` raised while the parser builds an attribute or checks an
//! operation definition is folded into a `ParseError` pinned to the offending
//! token range; outside parsing it propagates to the caller unchanged.

use std::fmt;

use crate::history::History;
use crate::location::Span;

/// A structural invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{message}")]
pub struct VerifyError {
    pub message: String,
}

impl VerifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A grammar mismatch at a specific source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at offset {}: {}",
            self.span.start, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Terminal result of a failed parse: the selected diagnostic plus the full
/// failure history accumulated while backtracking.
#[derive(Debug)]
pub struct ParseFailure {
    /// The diagnostic selected for a casual caller.
    pub error: ParseError,
    /// Every failed attempt, for tooling.
    pub history: History,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for ParseFailure {}
