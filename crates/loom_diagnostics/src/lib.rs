//! Structured diagnostics for fabric construction.
//!
//! This crate provides [`Diagnostic`] messages with severity levels, codes,
//! and grid locations. The thread-safe [`DiagnosticSink`] accumulates
//! diagnostics while the routing graph is built, and [`TerminalRenderer`]
//! formats them for the surrounding command-line layer.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod location;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use location::Location;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
