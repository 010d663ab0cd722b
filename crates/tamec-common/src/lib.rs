//! Common types for the tamec compiler core.
//!
//! This crate provides the foundational types shared by the AST and the
//! code generator:
//! - Source line spans (`LineSpan`)
//! - Compiler diagnostics (`Diagnostic`, `DiagnosticCategory`) with
//!   stable numeric codes

// Line spans - source location tracking (1-based line numbers)
pub mod span;
pub use span::LineSpan;

// Diagnostics - internal-consistency failures surfaced to the caller
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};
