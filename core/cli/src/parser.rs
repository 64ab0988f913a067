//! Command line argument parsing for the `pathtrace` binary.
//!
//! Every flag that mirrors a configuration key overrides the value loaded
//! from `pathtrace.toml`; flags that are not given leave the file value alone.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pathtrace::{ChainOrder, TransformConfig};

/// Command line interface definition for the function-path instrumenter.
///
/// ## Examples
///
/// Instrument a Babel AST and print the result:
/// ```bash
/// pathtrace app.ast.json
/// ```
///
/// Write the output and the runtime module next to each other:
/// ```bash
/// pathtrace app.ast.json -o out/app.ast.json --emit-runtime out/runtime.js \
///     --runtime-source ./runtime.js
/// ```
#[derive(Parser)]
#[command(
    name = "pathtrace",
    author,
    version,
    about = "Instrument named JavaScript functions so thrown errors carry a call path",
    long_about = "The 'pathtrace' command reads a Babel AST JSON document, wraps every named \
function so errors leaving it are rethrown as PathError carriers, and writes the instrumented \
AST back as JSON. Configuration is read from --config or from the nearest pathtrace.toml."
)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Cli {
    /// Babel AST JSON file (`File` or `Program` root).
    pub(crate) path: PathBuf,

    /// Write the instrumented AST here instead of stdout.
    #[clap(short = 'o', long = "output")]
    pub(crate) output: Option<PathBuf>,

    /// Configuration file. Without it the nearest `pathtrace.toml` above the
    /// input file is used, if any.
    #[clap(long = "config")]
    pub(crate) config: Option<PathBuf>,

    /// Separator between qualified name parts and path entries.
    #[clap(long = "delimiter")]
    pub(crate) delimiter: Option<String>,

    /// Which end of the path the catching function is written to.
    #[clap(long = "chain-order", value_enum)]
    pub(crate) chain_order: Option<ChainOrderArg>,

    /// Leave class methods uninstrumented.
    #[clap(long = "no-class-methods", action = clap::ArgAction::SetTrue)]
    pub(crate) no_class_methods: bool,

    /// Ignore `@onError` markers and always put the whole body in the try block.
    #[clap(long = "no-error-hook", action = clap::ArgAction::SetTrue)]
    pub(crate) no_error_hook: bool,

    /// Module specifier the injected runtime binding loads `PathError` from.
    #[clap(long = "runtime-source")]
    pub(crate) runtime_source: Option<String>,

    /// Also write the JavaScript runtime module to this file.
    #[clap(long = "emit-runtime")]
    pub(crate) emit_runtime: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[clap(long = "pretty", action = clap::ArgAction::SetTrue)]
    pub(crate) pretty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum ChainOrderArg {
    OuterFirst,
    InnerFirst,
}

impl From<ChainOrderArg> for ChainOrder {
    fn from(arg: ChainOrderArg) -> Self {
        match arg {
            ChainOrderArg::OuterFirst => ChainOrder::OuterFirst,
            ChainOrderArg::InnerFirst => ChainOrder::InnerFirst,
        }
    }
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub(crate) fn apply_overrides(&self, config: &mut TransformConfig) {
        if let Some(delimiter) = &self.delimiter {
            config.delimiter.clone_from(delimiter);
        }
        if let Some(order) = self.chain_order {
            config.chain_order = order.into();
        }
        if self.no_class_methods {
            config.include_class_methods = false;
        }
        if self.no_error_hook {
            config.support_error_hook = false;
        }
        if let Some(source) = &self.runtime_source {
            config.runtime.source.clone_from(source);
        }
    }
}
