//! A unified error type bridging the three compiler-phase error
//! types (`ParseError`, `ImportResolutionError`, `SemanticError`) into
//! one enum the CLI driver can match on for exit-code purposes.
//!
//! Phase error types stay independent (each module knows nothing
//! about the others); this module is the only place that needs to.

use thiserror::Error;

use crate::analyzer::SemanticError;
use crate::parser::ParseError;
use crate::resolver::ImportResolutionError;

/// Stable numeric codes the CLI maps onto process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// A source file failed to parse.
    Syntax = 1,
    /// An import could not be resolved (missing file, cycle, duplicate FQCN, ...).
    Import = 2,
    /// Semantic analysis found one or more type/scope errors.
    Semantic = 3,
}

impl ErrorCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Every error the compiler front-end's pipeline can produce.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Import(#[from] ImportResolutionError),

    /// Semantic analysis never aborts early, so by the time this
    /// variant is constructed there may be more than one error; the
    /// CLI driver is responsible for rendering all of them.
    #[error("{} semantic error(s), first: {}", .0.len(), .0.first().map(|e| e.to_string()).unwrap_or_default())]
    Semantic(Vec<SemanticError>),
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Parse(_) => ErrorCode::Syntax,
            CompileError::Import(_) => ErrorCode::Import,
            CompileError::Semantic(_) => ErrorCode::Semantic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_map::Position;

    fn pos() -> Position {
        Position { file_name: "t.veny".to_string(), line: 1, column: 1 }
    }

    #[test]
    fn parse_error_maps_to_syntax_code() {
        let err = CompileError::from(ParseError::new(pos(), "unexpected token"));
        assert_eq!(err.code().code(), 1);
    }

    #[test]
    fn import_error_maps_to_import_code() {
        let err = CompileError::from(ImportResolutionError::FileNotFound { fqcn: "a.B".to_string() });
        assert_eq!(err.code().code(), 2);
    }

    #[test]
    fn semantic_errors_map_to_semantic_code_and_report_the_first() {
        let errors = vec![
            SemanticError { message: "first problem".to_string(), position: pos() },
            SemanticError { message: "second problem".to_string(), position: pos() },
        ];
        let err = CompileError::Semantic(errors);
        assert_eq!(err.code().code(), 3);
        assert!(err.to_string().contains("first problem"));
        assert!(err.to_string().contains("2 semantic"));
    }
}
