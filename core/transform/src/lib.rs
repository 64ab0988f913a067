#![warn(clippy::pedantic)]

//! Function-path instrumentation over a JavaScript arena AST.
//!
//! The crate rewrites every named function so that an error leaving it is
//! rethrown as a `PathError` carrier whose `functionPath` records the chain of
//! instrumented functions the error crossed.
//!
//! ## Phases
//!
//! [`Instrumenter::run`] works in three phases:
//!
//! 1. **Select** - [`selector::select_frames`] walks the tree pre-order and
//!    computes the qualified name of each frame. Structural problems
//!    (anonymous classes, frames that already carry a generated rethrow) are
//!    collected; if there are any the run fails before a single node changes.
//! 2. **Transform** - [`frame::FrameTransformer`] rewrites each frame
//!    independently, either merging into an existing top-level handler or
//!    wrapping the body in a fresh `try`/`catch`.
//! 3. **Inject** - [`binding::inject_runtime_binding`] makes the carrier
//!    constructor visible to the generated code.
//!
//! ## Example
//!
//! ```
//! use pathtrace_ast::{arena::Arena, builder::Builder};
//! use pathtrace_transform::{Instrumenter, TransformConfig};
//!
//! let mut arena = Arena::new();
//! let mut b = Builder::new(&mut arena);
//! let method = b.class_method("bar", &[], vec![]);
//! let class = b.class_declaration(Some("Foo"), vec![method]);
//! b.program(vec![class]);
//!
//! let report = Instrumenter::new(TransformConfig::default()).run(&mut arena).unwrap();
//! assert_eq!(report.frames[0].qualified_name, "Foo -> bar");
//! assert!(report.runtime_injected);
//! ```

use anyhow::bail;
use log::info;
use pathtrace_ast::arena::Arena;

use crate::{
    binding::inject_runtime_binding,
    errors::TransformError,
    frame::{FrameShape, FrameTransformer},
    selector::{FrameKind, select_frames},
};

pub mod binding;
pub mod config;
pub mod errors;
pub mod fragment;
pub mod frame;
pub mod selector;

pub use config::{ImportStyle, RuntimeBinding, TransformConfig};
pub use pathtrace_runtime::ChainOrder;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub qualified_name: String,
    pub kind: FrameKind,
    pub shape: FrameShape,
}

/// Outcome of a successful run. Frames are in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentReport {
    pub frames: Vec<FrameReport>,
    pub runtime_injected: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Instrumenter {
    config: TransformConfig,
}

impl Instrumenter {
    #[must_use]
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Instruments every selectable frame of `arena` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, if selection reports
    /// any diagnostic (in which case the tree is left untouched), or if a frame
    /// fails to transform. All diagnostics are reported together.
    pub fn run(&self, arena: &mut Arena) -> anyhow::Result<InstrumentReport> {
        self.config.validate()?;

        let selection = select_frames(arena, &self.config);
        let mut errors = selection.errors;
        errors.extend(selection.already_instrumented.into_iter().map(|frame| {
            TransformError::AlreadyInstrumented {
                name: frame.qualified_name,
                location: frame.location,
            }
        }));
        if !errors.is_empty() {
            bail!(join_errors(&errors));
        }

        let transformer = FrameTransformer::new(&self.config);
        let mut report = InstrumentReport::default();
        for frame in selection.frames {
            match transformer.transform(arena, &frame) {
                Ok(shape) => report.frames.push(FrameReport {
                    qualified_name: frame.qualified_name,
                    kind: frame.kind,
                    shape,
                }),
                Err(err) => errors.push(err),
            }
        }
        if !errors.is_empty() {
            bail!(join_errors(&errors));
        }

        if !report.frames.is_empty() {
            report.runtime_injected = inject_runtime_binding(arena, &self.config.runtime)?;
        }
        info!(
            "instrumented {} frame(s), runtime binding {}",
            report.frames.len(),
            if report.runtime_injected {
                "injected"
            } else {
                "not injected"
            }
        );
        Ok(report)
    }
}

fn join_errors(errors: &[TransformError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
