//! JavaScript source of the runtime module instrumented programs depend on.
//!
//! The generated catch fragments construct carriers with `new <Local>(err, path)`
//! and recognise them with `err instanceof <Local>`, where `<Local>` is the
//! binding the transformer injects for this module. Write it next to the
//! instrumented output (or publish it under the configured specifier) so that
//! binding resolves.

/// CommonJS module exporting the `PathError` constructor.
pub const RUNTIME_MODULE: &str = r#"'use strict';

/**
 * Error carrier that accumulates the chain of instrumented functions
 * an error propagated through.
 */
function PathError(err, functionPath) {
  this.name = 'PathError';
  this.functionPath = functionPath || '';
  this.message = (err && err.message) || '';
  this.stack = err && err.stack;
}

PathError.prototype = Object.create(Error.prototype);
PathError.prototype.constructor = PathError;

PathError.prototype.toString = function toString() {
  return this.message + ' | Location (' + this.functionPath + ')';
};

module.exports = PathError;
module.exports.default = PathError;
"#;
