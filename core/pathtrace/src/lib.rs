#![warn(clippy::pedantic)]
//! Orchestration crate for function-path instrumentation.
//!
//! The crate ties the workspace together: it reads a Babel AST JSON document
//! into an arena, instruments every named function so errors leaving it carry
//! a call path, and writes the tree back out.
//!
//! ```text
//! Babel JSON → Arena → select frames → transform frames → inject runtime binding → Babel JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use pathtrace::{emit, instrument, parse, TransformConfig};
//!
//! fn run(source: &str) -> anyhow::Result<String> {
//!     let mut arena = parse(source)?;
//!     instrument(&mut arena, &TransformConfig::default())?;
//!     emit(&arena, false)
//! }
//!
//! let source = r#"{"type": "Program", "sourceType": "script", "body": [
//!     {"type": "FunctionDeclaration",
//!      "id": {"type": "Identifier", "name": "inner"},
//!      "params": [],
//!      "body": {"type": "BlockStatement", "body": [], "directives": []}}
//! ]}"#;
//! let output = run(source)?;
//! assert!(output.contains("functionPath"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Runtime dependency
//!
//! Instrumented output refers to the carrier constructor through the binding
//! configured in [`RuntimeBinding`]. The module it resolves to is
//! [`runtime_module`]; ship it next to the output or under the configured
//! specifier.
//!
//! ## Pass ordering
//!
//! Hosts that run further rewrites should register them in a
//! [`pipeline::Pipeline`] together with [`pipeline::InstrumentPass`], which
//! always runs first so recorded names match the source as written.
//!
//! ## Architecture
//!
//! - [`pathtrace_ast`] - arena AST, node builder, Babel JSON interop
//! - [`pathtrace_transform`] - selector, frame transformer, configuration
//! - [`pathtrace_runtime`] - the `PathError` carrier model and its JS module

use pathtrace_ast::{arena::Arena, json};

pub mod pipeline;

pub use pathtrace_runtime::{ChainOrder, PathError};
pub use pathtrace_transform::{
    ImportStyle, InstrumentReport, Instrumenter, RuntimeBinding, TransformConfig,
};

/// Reads a Babel AST JSON document (`File` or `Program` root).
///
/// # Errors
///
/// Returns an error if the text is not JSON or not a Babel AST.
pub fn parse(source: &str) -> anyhow::Result<Arena> {
    Ok(json::from_str(source)?)
}

/// Instruments every named function of `arena` in place.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any frame cannot be
/// instrumented. Diagnostics found before mutation leave the tree untouched.
pub fn instrument(arena: &mut Arena, config: &TransformConfig) -> anyhow::Result<InstrumentReport> {
    Instrumenter::new(config.clone()).run(arena)
}

/// Writes `arena` back as Babel AST JSON.
///
/// # Errors
///
/// Returns an error if the arena has no root or references a missing node.
pub fn emit(arena: &Arena, pretty: bool) -> anyhow::Result<String> {
    Ok(json::to_string(arena, pretty)?)
}

/// JavaScript source of the runtime module instrumented code depends on.
#[must_use]
pub fn runtime_module() -> &'static str {
    pathtrace_runtime::RUNTIME_MODULE
}
