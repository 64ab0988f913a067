//! Rewrites one selected frame so that every error leaving its body is
//! rethrown as a path-annotated carrier.
//!
//! A frame whose body already has a `try`/`catch (e)` at the top level gets
//! the rethrow appended to that handler. Every other frame has its body
//! wrapped in a fresh `try`/`catch`, optionally moving the statements from
//! the error hook marker onwards into the catch clause.

use std::fmt::{self, Display, Formatter};

use log::{debug, warn};
use pathtrace_ast::{
    arena::Arena,
    builder::Builder,
    nodes::{
        BlockStatement, CatchClause, ClassMethod, FunctionDeclaration, FunctionExpression, NodeId,
        NodeKind, ObjectMethod, TryStatement,
    },
};
use serde_json::Value;

use crate::{
    config::TransformConfig, errors::TransformError, fragment::build_fragment, selector::Frame,
};

/// What a transform did to a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameShape {
    /// The body was wrapped; `relocated` hook statements moved into the catch.
    Wrapped { relocated: usize },
    /// The rethrow was appended to an existing handler binding `param`.
    Merged { param: String },
}

impl Display for FrameShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FrameShape::Wrapped { relocated: 0 } => write!(f, "wrapped"),
            FrameShape::Wrapped { relocated } => {
                write!(f, "wrapped, {relocated} hook statement(s) relocated")
            }
            FrameShape::Merged { param } => write!(f, "merged into catch ({param})"),
        }
    }
}

pub struct FrameTransformer<'c> {
    config: &'c TransformConfig,
}

impl<'c> FrameTransformer<'c> {
    #[must_use]
    pub fn new(config: &'c TransformConfig) -> Self {
        Self { config }
    }

    /// Instruments `frame` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame's nodes are no longer in the arena.
    pub fn transform(&self, arena: &mut Arena, frame: &Frame) -> Result<FrameShape, TransformError> {
        if let Some(try_stmt) = frame.existing_try {
            if let Some((handler_body, param)) = mergeable_handler(arena, try_stmt) {
                return self.merge(arena, frame, handler_body, param);
            }
            warn!(
                "{}: catch clause of `{}` binds no identifier, wrapping the whole body instead",
                frame.location, frame.qualified_name
            );
        }
        self.wrap(arena, frame)
    }

    fn merge(
        &self,
        arena: &mut Arena,
        frame: &Frame,
        handler_body: NodeId,
        param: String,
    ) -> Result<FrameShape, TransformError> {
        let fragment = build_fragment(arena, self.config, &frame.qualified_name, &param);
        arena.modify(handler_body, |kind| {
            if let NodeKind::BlockStatement(BlockStatement { body }) = kind {
                body.push(fragment);
            }
        })?;
        debug!("{}: merged `{}` into catch ({param})", frame.location, frame.qualified_name);
        Ok(FrameShape::Merged { param })
    }

    fn wrap(&self, arena: &mut Arena, frame: &Frame) -> Result<FrameShape, TransformError> {
        let statements = arena
            .kind(frame.body)
            .and_then(NodeKind::as_block)
            .map(<[NodeId]>::to_vec)
            .ok_or_else(|| TransformError::MissingBody {
                name: frame.qualified_name.clone(),
                location: frame.location.clone(),
            })?;

        let hook = if self.config.support_error_hook {
            find_hook(arena, &statements, &self.config.error_hook_marker)
        } else {
            None
        };
        let split = hook.unwrap_or(statements.len());
        if let Some(index) = hook {
            self.detach_marker(arena, &statements, index)?;
        }
        let (try_part, hook_part) = statements.split_at(split);
        let relocated = hook_part.len();
        let mut catch_body = hook_part.to_vec();

        // The original block becomes the try block.
        let try_part = try_part.to_vec();
        arena.modify(frame.body, |kind| {
            if let NodeKind::BlockStatement(BlockStatement { body }) = kind {
                *body = try_part;
            }
        })?;

        let param = self.config.catch_param.as_str();
        catch_body.push(build_fragment(arena, self.config, &frame.qualified_name, param));
        let mut b = Builder::new(arena);
        let catch_block = b.block(catch_body);
        let param = b.identifier(param);
        let handler = b.catch_clause(Some(param), catch_block);
        let try_stmt = b.try_statement(frame.body, Some(handler), None);
        let new_body = b.block(vec![try_stmt]);

        take_over_block(arena, frame.body, new_body)?;
        arena.modify(frame.function, |kind| set_function_body(kind, new_body))?;

        debug!(
            "{}: wrapped `{}` ({relocated} hook statement(s))",
            frame.location, frame.qualified_name
        );
        Ok(FrameShape::Wrapped { relocated })
    }

    /// Removes the marker comment from the hook statement and every trailing
    /// comment of the statement before it.
    fn detach_marker(
        &self,
        arena: &mut Arena,
        statements: &[NodeId],
        index: usize,
    ) -> Result<(), TransformError> {
        let marker = self.config.error_hook_marker.as_str();
        arena
            .node_mut(statements[index])?
            .comments
            .leading
            .retain(|comment| !comment.contains(marker));
        if index > 0 {
            arena.node_mut(statements[index - 1])?.comments.trailing.clear();
        }
        Ok(())
    }
}

fn find_hook(arena: &Arena, statements: &[NodeId], marker: &str) -> Option<usize> {
    statements.iter().position(|stmt| {
        arena.get(*stmt).is_some_and(|node| {
            node.comments
                .leading
                .iter()
                .any(|comment| comment.contains(marker))
        })
    })
}

/// The handler body and parameter name of `try_stmt`, when its catch clause
/// binds a plain identifier.
fn mergeable_handler(arena: &Arena, try_stmt: NodeId) -> Option<(NodeId, String)> {
    let NodeKind::TryStatement(TryStatement {
        handler: Some(handler),
        ..
    }) = arena.kind(try_stmt)?
    else {
        return None;
    };
    let NodeKind::CatchClause(CatchClause {
        param: Some(param),
        body,
    }) = arena.kind(*handler)?
    else {
        return None;
    };
    let name = arena.identifier_name(*param)?;
    Some((*body, name.to_string()))
}

/// Moves location, inner comments and directives of the original body onto
/// the block that replaces it.
fn take_over_block(arena: &mut Arena, old: NodeId, new: NodeId) -> Result<(), TransformError> {
    let old_node = arena.node_mut(old)?;
    let location = old_node.location.clone();
    let inner = std::mem::take(&mut old_node.comments.inner);
    let directives = old_node
        .extra
        .insert("directives".to_string(), Value::Array(Vec::new()));

    let new_node = arena.node_mut(new)?;
    new_node.location = location;
    new_node.comments.inner = inner;
    if let Some(directives) = directives {
        new_node.extra.insert("directives".to_string(), directives);
    }
    Ok(())
}

fn set_function_body(kind: &mut NodeKind, new_body: NodeId) {
    match kind {
        NodeKind::FunctionDeclaration(FunctionDeclaration { body, .. })
        | NodeKind::FunctionExpression(FunctionExpression { body, .. })
        | NodeKind::ObjectMethod(ObjectMethod { body, .. })
        | NodeKind::ClassMethod(ClassMethod { body, .. }) => *body = new_body,
        _ => {}
    }
}
