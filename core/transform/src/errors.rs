use std::path::PathBuf;

use pathtrace_ast::{errors::AstError, nodes::Location};
use thiserror::Error;

#[derive(Debug, Error)]
#[must_use]
pub enum TransformError {
    #[error("{location}: method `{method}` belongs to an anonymous class, name the class to instrument it")]
    AnonymousClass { method: String, location: Location },
    #[error("{location}: `{name}` is already declared here, the runtime binding would clash with it")]
    BindingConflict { name: String, location: Location },
    #[error("{location}: `{name}` has no block body")]
    MissingBody { name: String, location: Location },
    #[error("{location}: `{name}` is already instrumented")]
    AlreadyInstrumented { name: String, location: Location },
    #[error(transparent)]
    Ast(#[from] AstError),
}

#[derive(Debug, Error)]
#[must_use]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("`{field}` must be a JavaScript identifier, found `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("`catchParam` and `runtime.localName` are both `{name}`")]
    CatchParamShadowsRuntime { name: String },
    #[error("`errorHookMarker` must not be empty")]
    EmptyMarker,
}
