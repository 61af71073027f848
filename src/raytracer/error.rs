//! Crate-wide error enum for the scene parser (spec §7). Every fatal parse
//! condition - syntax errors, type mismatches, undeclared identifiers,
//! redefinitions across types, and geometry validation failures - surfaces
//! through this enum. Runtime numerical events (spec §7's "recovered
//! locally") never reach here; those resolve silently inside the primitive
//! kernel's intersection routines.

use thiserror::Error;

/// File/line/lexeme context every fatal parse error carries, per spec §7
/// ("Reported with filename, line number, token lexeme, and the innermost
/// enclosing-brace context").
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub lexeme: String,
    pub brace_context: String,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, lexeme: impl Into<String>, brace_context: impl Into<String>) -> Self {
        SourceLocation { file: file.into(), line, lexeme: lexeme.into(), brace_context: brace_context.into() }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: near '{}' (in {})", self.file, self.line, self.lexeme, self.brace_context)
    }
}

#[derive(Debug, Error)]
pub enum RtError {
    #[error("syntax error at {0}")]
    Syntax(SourceLocation),

    #[error("unexpected end of file at {0}")]
    UnexpectedEof(SourceLocation),

    #[error("type mismatch at {0}: expected {expected}, found {found}")]
    TypeMismatch { loc: SourceLocation, expected: String, found: String },

    #[error("undeclared identifier '{name}' at {loc}")]
    UndeclaredIdentifier { loc: SourceLocation, name: String },

    #[error("redefinition of '{name}' with a different type at {loc}")]
    Redefinition { loc: SourceLocation, name: String },

    #[error("invalid value at {0}")]
    InvalidValue(SourceLocation),

    #[error("geometry validation failed at {loc}: {reason}")]
    GeometryValidation { loc: SourceLocation, reason: String },

    #[error("I/O error reading '{path}': {source}")]
    Io { path: String, #[source] source: std::io::Error },
}

pub type Result<T> = std::result::Result<T, RtError>;
