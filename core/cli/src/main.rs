#![warn(clippy::pedantic)]

//! # pathtrace CLI
//!
//! Instruments a Babel AST JSON document so that every named function
//! rethrows errors as `PathError` carriers recording the call path.
//!
//! 1. Load configuration (`--config`, else the nearest `pathtrace.toml`),
//!    then apply command line overrides.
//! 2. Parse the input document.
//! 3. Instrument it.
//! 4. Write the result to `-o` or stdout, and the runtime module to
//!    `--emit-runtime` when requested.
//!
//! ## Exit codes
//! * 0 – success.
//! * 1 – usage / IO / parse / transform failure.
//!
//! ## Example
//! ```bash
//! RUST_LOG=debug pathtrace app.ast.json -o app.instrumented.json
//! ```

mod parser;
use clap::Parser;
use log::{debug, info};
use parser::Cli;
use pathtrace::{TransformConfig, emit, instrument, parse, runtime_module};
use pathtrace_transform::config::find_config_file;
use std::{
    fs,
    path::Path,
    process::{self},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default())
        .format_timestamp(None)
        .try_init()
        .ok();

    let args = Cli::parse();
    if !args.path.exists() {
        eprintln!("Error: path not found");
        process::exit(1);
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };
    args.apply_overrides(&mut config);

    let source = match fs::read_to_string(&args.path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {}: {e}", args.path.display());
            process::exit(1);
        }
    };
    let mut arena = match parse(&source) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(1);
        }
    };

    let report = match instrument(&mut arena, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Instrumentation failed: {e}");
            process::exit(1);
        }
    };
    for frame in &report.frames {
        debug!("{} ({}): {}", frame.qualified_name, frame.kind, frame.shape);
    }

    let output = match emit(&arena, args.pretty) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Failed to serialize AST: {e}");
            process::exit(1);
        }
    };
    match &args.output {
        Some(path) => {
            if let Err(e) = write_file(path, &output) {
                eprintln!("Failed to write {}: {e}", path.display());
                process::exit(1);
            }
            info!("instrumented AST written to {}", path.display());
        }
        None => println!("{output}"),
    }

    if let Some(path) = &args.emit_runtime {
        if let Err(e) = write_file(path, runtime_module()) {
            eprintln!("Failed to write runtime module: {e}");
            process::exit(1);
        }
        info!("runtime module written to {}", path.display());
    }
    process::exit(0);
}

fn load_config(args: &Cli) -> anyhow::Result<TransformConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(&args.path),
    };
    let Some(path) = path else {
        debug!("no pathtrace.toml found, using defaults");
        return Ok(TransformConfig::default());
    };
    debug!("loading configuration from {}", path.display());
    Ok(TransformConfig::load(&path)?)
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
