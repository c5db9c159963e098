//! Resolution errors
//!
//! Every error aborts the parse. There is no recovery and no partial module;
//! the caller receives exactly one [`ParseError`] naming what went wrong and
//! where.

use thiserror::Error;

use super::ast::SourceLocation;

/// Errors raised while parsing and resolving a token stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Token sequence does not match the grammar at this position
    #[error("Syntax error at {location}: {message}")]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    /// Type keyword outside the closed data type mapping
    #[error("Unknown type '{name}' at {location}")]
    UnknownType {
        name: String,
        location: SourceLocation,
    },

    /// Name declared twice in the same scope
    #[error("Duplicate symbol '{name}' at {location}")]
    DuplicateSymbol {
        name: String,
        location: SourceLocation,
    },

    /// Reference to a name with no declaration in scope
    #[error("Undeclared symbol '{name}' at {location}")]
    UndeclaredSymbol {
        name: String,
        location: SourceLocation,
    },

    #[error("Type mismatch at {location}: {message}")]
    TypeMismatch {
        message: String,
        location: SourceLocation,
    },

    /// Assignment to a global constant
    #[error("Cannot assign to constant '{name}' at {location}")]
    ConstAssignment {
        name: String,
        location: SourceLocation,
    },
}

/// Category of a [`ParseError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnknownType,
    DuplicateSymbol,
    UndeclaredSymbol,
    TypeMismatch,
    ConstAssignment,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Syntax { .. } => ErrorKind::Syntax,
            ParseError::UnknownType { .. } => ErrorKind::UnknownType,
            ParseError::DuplicateSymbol { .. } => ErrorKind::DuplicateSymbol,
            ParseError::UndeclaredSymbol { .. } => ErrorKind::UndeclaredSymbol,
            ParseError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ParseError::ConstAssignment { .. } => ErrorKind::ConstAssignment,
        }
    }

    /// Location of the offending token
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::UnknownType { location, .. }
            | ParseError::DuplicateSymbol { location, .. }
            | ParseError::UndeclaredSymbol { location, .. }
            | ParseError::TypeMismatch { location, .. }
            | ParseError::ConstAssignment { location, .. } => *location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = ParseError::UndeclaredSymbol {
            name: "x".to_string(),
            location: SourceLocation::new(3, 7),
        };
        assert_eq!(
            err.to_string(),
            "Undeclared symbol 'x' at line 3, column 7"
        );
        assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
        assert_eq!(err.location(), SourceLocation::new(3, 7));
    }
}
