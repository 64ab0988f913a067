//! Ordered execution of tree passes.
//!
//! Instrumentation must see function names as they were written, so it runs
//! in [`Stage::ProgramEnter`], ahead of every [`Stage::Default`] pass no matter
//! when the passes were registered.

use anyhow::Context;
use log::debug;
use pathtrace_ast::arena::Arena;
use pathtrace_transform::{InstrumentReport, Instrumenter, TransformConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Runs on the untouched program, before any other pass.
    ProgramEnter,
    Default,
}

pub trait Pass {
    fn name(&self) -> &str;

    fn stage(&self) -> Stage {
        Stage::Default
    }

    /// # Errors
    ///
    /// Returns an error if the pass cannot be applied to `arena`.
    fn run(&mut self, arena: &mut Arena) -> anyhow::Result<()>;
}

impl<P: Pass + ?Sized> Pass for &mut P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn stage(&self) -> Stage {
        (**self).stage()
    }

    fn run(&mut self, arena: &mut Arena) -> anyhow::Result<()> {
        (**self).run(arena)
    }
}

/// Passes are borrowed for `'p`, so a caller can register `&mut pass` and
/// inspect the pass once the pipeline is dropped.
#[derive(Default)]
pub struct Pipeline<'p> {
    passes: Vec<Box<dyn Pass + 'p>>,
}

impl<'p> Pipeline<'p> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'p) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Pass names in the order [`Pipeline::run`] executes them.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        self.ordered_indices()
            .into_iter()
            .map(|index| self.passes[index].name())
            .collect()
    }

    /// Runs `ProgramEnter` passes, then `Default` passes, each group in
    /// registration order. Stops at the first failing pass.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing pass.
    pub fn run(&mut self, arena: &mut Arena) -> anyhow::Result<()> {
        for index in self.ordered_indices() {
            let pass = &mut self.passes[index];
            debug!("running pass `{}` ({:?})", pass.name(), pass.stage());
            let name = pass.name().to_string();
            pass.run(arena)
                .with_context(|| format!("pass `{name}` failed"))?;
        }
        Ok(())
    }

    fn ordered_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.passes.len()).collect();
        // stable: registration order within a stage
        indices.sort_by_key(|index| self.passes[*index].stage());
        indices
    }
}

/// [`Instrumenter`] as a pipeline pass. The report of the last run is kept.
pub struct InstrumentPass {
    instrumenter: Instrumenter,
    report: Option<InstrumentReport>,
}

impl InstrumentPass {
    #[must_use]
    pub fn new(config: TransformConfig) -> Self {
        Self {
            instrumenter: Instrumenter::new(config),
            report: None,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&InstrumentReport> {
        self.report.as_ref()
    }
}

impl Pass for InstrumentPass {
    fn name(&self) -> &str {
        "instrument-function-paths"
    }

    fn stage(&self) -> Stage {
        Stage::ProgramEnter
    }

    fn run(&mut self, arena: &mut Arena) -> anyhow::Result<()> {
        self.report = Some(self.instrumenter.run(arena)?);
        Ok(())
    }
}
