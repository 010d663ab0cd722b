//! Compiler diagnostics.
//!
//! Every failure the code generator can detect is an internal-consistency
//! error: compilation aborts with a diagnostic referencing the offending
//! node's source line. There is no partial or degraded compilation mode.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    /// 1-based source line of the offending node; 0 when the node carries
    /// no position information.
    pub line: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(line: u32, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            line,
            message_text: message.into(),
        }
    }
}

/// Stable numeric codes for generator-internal failures.
pub mod diagnostic_codes {
    /// An expression with zero elements reached a position that requires
    /// rendered text (condition, for-clause, twait body).
    pub const EMPTY_EXPRESSION: u32 = 9001;
    /// A suspension point reached a pass-through emission path.
    pub const MISPLACED_TWAIT: u32 = 9002;
    /// A return statement was lowered with no enclosing function.
    pub const RETURN_OUTSIDE_FUNCTION: u32 = 9003;
    /// A node outside the closed statement set reached the generator.
    pub const UNSUPPORTED_CONSTRUCT: u32 = 9004;
    /// The generator produced a fragment that violates its own contract.
    pub const INTERNAL: u32 = 9005;
}
