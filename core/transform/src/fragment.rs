//! The statement appended to every instrumented catch clause.
//!
//! ```text
//! throw new PathError(err, err instanceof PathError
//!     ? "outer -> " + err.functionPath
//!     : "outer");
//! ```
//!
//! With [`ChainOrder::InnerFirst`] the consequent becomes
//! `err.functionPath + " -> outer"`.

use pathtrace_ast::{
    arena::Arena,
    builder::Builder,
    nodes::{NewExpression, NodeId, NodeKind, ThrowStatement},
};
use pathtrace_runtime::ChainOrder;

use crate::config::TransformConfig;

/// Builds the rethrow statement for the frame `name`, reading the caught
/// value from `param`.
pub fn build_fragment(
    arena: &mut Arena,
    config: &TransformConfig,
    name: &str,
    param: &str,
) -> NodeId {
    let local = config.runtime.local_name.as_str();
    let delimiter = config.delimiter();
    let mut b = Builder::new(arena);

    let caught = b.identifier(param);
    let carrier_ctor = b.identifier(local);
    let test = b.binary("instanceof", caught, carrier_ctor);

    let caught = b.identifier(param);
    let inner_path = b.member(caught, "functionPath");
    let consequent = match config.chain_order {
        ChainOrder::OuterFirst => {
            let prefix = b.string_literal(&format!("{name}{delimiter}"));
            b.binary("+", prefix, inner_path)
        }
        ChainOrder::InnerFirst => {
            let suffix = b.string_literal(&format!("{delimiter}{name}"));
            b.binary("+", inner_path, suffix)
        }
    };
    let alternate = b.string_literal(name);
    let path = b.conditional(test, consequent, alternate);

    let callee = b.identifier(local);
    let caught = b.identifier(param);
    let carrier = b.new_expression(callee, vec![caught, path]);
    b.throw_statement(carrier)
}

/// Whether `stmt` has the shape [`build_fragment`] produces:
/// `throw new <local>(a, b)`.
#[must_use]
pub fn is_generated_fragment(arena: &Arena, stmt: NodeId, local: &str) -> bool {
    let Some(NodeKind::ThrowStatement(ThrowStatement { argument })) = arena.kind(stmt) else {
        return false;
    };
    let Some(NodeKind::NewExpression(NewExpression { callee, arguments })) = arena.kind(*argument)
    else {
        return false;
    };
    arguments.len() == 2 && arena.identifier_name(*callee) == Some(local)
}
