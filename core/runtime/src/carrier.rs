use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of the `name` field every carrier exposes.
pub const PATH_ERROR_NAME: &str = "PathError";

/// Which end of the accumulated path the catching frame is written to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainOrder {
    /// `outer -> inner`: the path reads like the call stack, top-down.
    #[default]
    OuterFirst,
    /// `inner -> outer`: the path reads in propagation order.
    InnerFirst,
}

/// An error that has crossed at least one instrumented frame.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} | Location ({function_path})")]
pub struct PathError {
    function_path: String,
    message: String,
}

impl PathError {
    /// Wraps `original` with an already composed `function_path`.
    ///
    /// The message is taken from the caught value; a value without a
    /// message yields an empty one.
    #[must_use]
    pub fn new(original: &Caught, function_path: impl Into<String>) -> Self {
        Self {
            function_path: function_path.into(),
            message: original.message().to_string(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        PATH_ERROR_NAME
    }

    #[must_use]
    pub fn function_path(&self) -> &str {
        &self.function_path
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Anything thrown that is not a carrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainError {
    pub message: Option<String>,
}

/// A value observed by a generated catch clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caught {
    Plain(PlainError),
    PathAnnotated(PathError),
}

impl Caught {
    #[must_use]
    pub fn plain(message: &str) -> Self {
        Caught::Plain(PlainError {
            message: Some(message.to_string()),
        })
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Caught::Plain(plain) => plain.message.as_deref().unwrap_or_default(),
            Caught::PathAnnotated(carrier) => carrier.message(),
        }
    }
}

impl From<PathError> for Caught {
    fn from(carrier: PathError) -> Self {
        Caught::PathAnnotated(carrier)
    }
}

impl From<PlainError> for Caught {
    fn from(plain: PlainError) -> Self {
        Caught::Plain(plain)
    }
}

/// Joins a frame name onto an inner path in the configured order.
#[must_use]
pub fn join_path(frame: &str, inner: &str, delimiter: &str, order: ChainOrder) -> String {
    match order {
        ChainOrder::OuterFirst => format!("{frame}{delimiter}{inner}"),
        ChainOrder::InnerFirst => format!("{inner}{delimiter}{frame}"),
    }
}

/// What the generated catch fragment of `frame` does with a caught value.
///
/// A plain error starts a new path; a carrier has its path extended and its
/// message carried over untouched.
#[must_use]
pub fn rethrow(caught: Caught, frame: &str, delimiter: &str, order: ChainOrder) -> PathError {
    let path = match &caught {
        Caught::PathAnnotated(inner) => {
            join_path(frame, inner.function_path(), delimiter, order)
        }
        Caught::Plain(_) => frame.to_string(),
    };
    PathError::new(&caught, path)
}
