//! Transformer configuration.
//!
//! The configuration is a plain serde record with camelCase keys, so the same
//! shape is accepted from a `pathtrace.toml` file, from a `[tool.pathtrace]`
//! section of a larger TOML file, or built in code. Every key is optional.

use std::path::{Path, PathBuf};

use pathtrace_runtime::ChainOrder;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_DELIMITER: &str = " -> ";
pub const DEFAULT_ERROR_HOOK_MARKER: &str = "@onError";
pub const DEFAULT_CATCH_PARAM: &str = "err";
pub const DEFAULT_RUNTIME_SOURCE: &str = "pathtrace/runtime";
pub const CONFIG_FILE_NAME: &str = "pathtrace.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TransformConfig {
    /// Joins qualified name parts and accumulated paths. Empty means default.
    pub delimiter: String,
    pub chain_order: ChainOrder,
    pub include_class_methods: bool,
    pub support_error_hook: bool,
    /// Substring a leading comment must contain to start the error hook.
    pub error_hook_marker: String,
    /// Catch binding of the handlers this crate generates.
    pub catch_param: String,
    pub runtime: RuntimeBinding,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            chain_order: ChainOrder::default(),
            include_class_methods: true,
            support_error_hook: true,
            error_hook_marker: DEFAULT_ERROR_HOOK_MARKER.to_string(),
            catch_param: DEFAULT_CATCH_PARAM.to_string(),
            runtime: RuntimeBinding::default(),
        }
    }
}

/// Where generated code gets the carrier constructor from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RuntimeBinding {
    /// Module specifier of the runtime module.
    pub source: String,
    /// Local name the constructor is bound to in every instrumented program.
    pub local_name: String,
    pub style: ImportStyle,
}

impl Default for RuntimeBinding {
    fn default() -> Self {
        Self {
            source: DEFAULT_RUNTIME_SOURCE.to_string(),
            local_name: pathtrace_runtime::PATH_ERROR_NAME.to_string(),
            style: ImportStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportStyle {
    /// `const PathError = require("...");`
    #[default]
    Require,
    /// `import PathError from "...";`
    Import,
}

impl TransformConfig {
    /// The delimiter actually used; an empty configured value falls back to
    /// [`DEFAULT_DELIMITER`].
    #[must_use]
    pub fn delimiter(&self) -> &str {
        if self.delimiter.is_empty() {
            DEFAULT_DELIMITER
        } else {
            &self.delimiter
        }
    }

    /// Joins two qualified name parts with the effective delimiter.
    #[must_use]
    pub fn qualify(&self, outer: &str, name: &str) -> String {
        format!("{outer}{}{name}", self.delimiter())
    }

    /// Checks the values generated code will be built from.
    ///
    /// # Errors
    ///
    /// Returns an error if a binding name is not a JavaScript identifier or
    /// the hook marker is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.catch_param) {
            return Err(ConfigError::InvalidIdentifier {
                field: "catchParam",
                value: self.catch_param.clone(),
            });
        }
        if !is_identifier(&self.runtime.local_name) {
            return Err(ConfigError::InvalidIdentifier {
                field: "runtime.localName",
                value: self.runtime.local_name.clone(),
            });
        }
        if self.catch_param == self.runtime.local_name {
            return Err(ConfigError::CatchParamShadowsRuntime {
                name: self.catch_param.clone(),
            });
        }
        if self.error_hook_marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        Ok(())
    }

    /// Parses TOML text. A `[tool.pathtrace]` section wins over top-level keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not TOML, has unknown keys or fails
    /// [`TransformConfig::validate`].
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let parse_error = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let table: toml::Table = toml::from_str(content).map_err(parse_error)?;
        let section = match table.get("tool").and_then(|tool| tool.get("pathtrace")) {
            Some(section) => section.clone(),
            None => toml::Value::Table(table),
        };
        let config: TransformConfig = section.try_into().map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }
}

/// Finds `pathtrace.toml` starting from a path and walking up.
#[must_use]
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// ASCII-only check for a plain JavaScript identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
