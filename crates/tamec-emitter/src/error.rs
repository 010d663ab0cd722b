//! Generator failure modes.
//!
//! A narrow, closed set: every variant is a compiler-internal
//! inconsistency that aborts compilation, carrying the offending node's
//! source line. Nothing here is a recoverable-and-continue condition.

use thiserror::Error;

use tamec_common::{Diagnostic, diagnostics::diagnostic_codes};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// An expression with zero elements reached a position that needs
    /// rendered text (condition, for-clause, twait body).
    #[error("line {line}: expression has no elements to emit")]
    EmptyExpression { line: u32 },

    /// A twait reached a pass-through emission path. Unreachable when
    /// suspension dispatch is correct; kept as a hard failure rather
    /// than a guess.
    #[error("line {line}: twait outside a continuation-passing context")]
    MisplacedTwait { line: u32 },

    /// A return statement was lowered in a continuation chain with no
    /// enclosing transformed function to continue into.
    #[error("line {line}: return with no enclosing function")]
    ReturnOutsideFunction { line: u32 },

    /// A node outside the closed statement set reached the generator.
    #[error("line {line}: unsupported construct `{kind}`")]
    UnsupportedConstruct { line: u32, kind: &'static str },

    /// The generator violated its own fragment contract.
    #[error("line {line}: internal consistency error: {message}")]
    Internal { line: u32, message: &'static str },
}

impl EmitError {
    /// Source line of the offending node.
    pub fn line(&self) -> u32 {
        match self {
            EmitError::EmptyExpression { line }
            | EmitError::MisplacedTwait { line }
            | EmitError::ReturnOutsideFunction { line }
            | EmitError::UnsupportedConstruct { line, .. }
            | EmitError::Internal { line, .. } => *line,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            EmitError::EmptyExpression { .. } => diagnostic_codes::EMPTY_EXPRESSION,
            EmitError::MisplacedTwait { .. } => diagnostic_codes::MISPLACED_TWAIT,
            EmitError::ReturnOutsideFunction { .. } => diagnostic_codes::RETURN_OUTSIDE_FUNCTION,
            EmitError::UnsupportedConstruct { .. } => diagnostic_codes::UNSUPPORTED_CONSTRUCT,
            EmitError::Internal { .. } => diagnostic_codes::INTERNAL,
        };
        Diagnostic::error(self.line(), self.to_string(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_carries_line_and_code() {
        let err = EmitError::UnsupportedConstruct {
            line: 17,
            kind: "Program",
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.line, 17);
        assert_eq!(diag.code, diagnostic_codes::UNSUPPORTED_CONSTRUCT);
        assert!(diag.message_text.contains("Program"));
    }
}
