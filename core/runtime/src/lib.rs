#![warn(clippy::pedantic)]
//! Runtime side of path tracing.
//!
//! Instrumented functions catch whatever propagates out of their body and
//! rethrow a [`PathError`] whose `function_path` names every instrumented
//! frame the error crossed. This crate holds the Rust model of that carrier
//! (used by the transformer to name things consistently and by the test
//! suite to state the expected paths) and the JavaScript source of the
//! module the generated code imports.
//!
//! ```
//! use pathtrace_runtime::{Caught, ChainOrder, rethrow};
//!
//! let inner = rethrow(Caught::plain("boom"), "inner", " -> ", ChainOrder::OuterFirst);
//! let outer = rethrow(Caught::from(inner), "outer", " -> ", ChainOrder::OuterFirst);
//! assert_eq!(outer.function_path(), "outer -> inner");
//! assert_eq!(outer.to_string(), "boom | Location (outer -> inner)");
//! ```

pub mod carrier;
pub mod module;

pub use carrier::{Caught, ChainOrder, PATH_ERROR_NAME, PathError, PlainError, join_path, rethrow};
pub use module::RUNTIME_MODULE;
