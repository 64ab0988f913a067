//! Decides which function-like nodes are instrumented and what they are called.

use std::fmt::{self, Display, Formatter};

use log::debug;
use pathtrace_ast::{
    arena::Arena,
    nodes::{
        AssignmentExpression, CatchClause, FunctionParts, Location, MemberExpression, NodeId,
        NodeKind, StringLiteral, TryStatement,
    },
};

use crate::{
    binding::binding_conflicts, config::TransformConfig, errors::TransformError,
    fragment::is_generated_fragment,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    FunctionDeclaration,
    FunctionExpression,
    ObjectMethod,
    ClassMethod,
}

impl Display for FrameKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::FunctionDeclaration => "function declaration",
            FrameKind::FunctionExpression => "function expression",
            FrameKind::ObjectMethod => "object method",
            FrameKind::ClassMethod => "class method",
        };
        f.write_str(name)
    }
}

/// A function selected for instrumentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub function: NodeId,
    pub kind: FrameKind,
    pub qualified_name: String,
    /// The `BlockStatement` body of `function`.
    pub body: NodeId,
    /// First direct-child `try` of the body that has a catch clause.
    pub existing_try: Option<NodeId>,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub frames: Vec<Frame>,
    pub already_instrumented: Vec<Frame>,
    pub errors: Vec<TransformError>,
}

impl Selection {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.already_instrumented.is_empty()
    }
}

/// Walks the whole program pre-order and collects the frames to instrument.
///
/// Once frames are found, any binding of the runtime local name that the
/// generated code would clash with is reported as well.
#[must_use]
pub fn select_frames(arena: &Arena, config: &TransformConfig) -> Selection {
    let mut selection = Selection::default();
    let Some(root) = arena.root() else {
        return selection;
    };
    let selector = Selector { arena, config };
    for id in arena.descendants(root) {
        selector.visit(id, &mut selection);
    }
    if !selection.frames.is_empty() {
        selection
            .errors
            .extend(binding_conflicts(arena, &config.runtime, &selection.frames));
    }
    selection
}

struct Selector<'a> {
    arena: &'a Arena,
    config: &'a TransformConfig,
}

impl<'a> Selector<'a> {
    fn visit(&self, id: NodeId, selection: &mut Selection) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let kind = match &node.kind {
            NodeKind::FunctionDeclaration(_) => FrameKind::FunctionDeclaration,
            NodeKind::FunctionExpression(_) => FrameKind::FunctionExpression,
            NodeKind::ObjectMethod(_) => FrameKind::ObjectMethod,
            NodeKind::ClassMethod(_) if self.config.include_class_methods => FrameKind::ClassMethod,
            _ => return,
        };
        let Some(parts) = node.kind.function_parts() else {
            return;
        };
        let location = node.location.clone();

        let Some(base) = self.base_name(&parts) else {
            debug!("{location}: skipping unnamed {kind}");
            return;
        };

        let qualified_name = match kind {
            FrameKind::ClassMethod => {
                let Some(class) = self.enclosing_class_name(id) else {
                    selection.errors.push(TransformError::AnonymousClass {
                        method: base.to_string(),
                        location,
                    });
                    return;
                };
                self.config.qualify(class, base)
            }
            FrameKind::FunctionExpression => match self.assigned_object_name(id) {
                Some(object) => self.config.qualify(&object, base),
                None => base.to_string(),
            },
            FrameKind::FunctionDeclaration | FrameKind::ObjectMethod => base.to_string(),
        };

        let Some(statements) = self.arena.kind(parts.body).and_then(NodeKind::as_block) else {
            selection.errors.push(TransformError::MissingBody {
                name: qualified_name,
                location,
            });
            return;
        };
        let existing_try = statements
            .iter()
            .copied()
            .find(|stmt| self.catch_clause_of(*stmt).is_some());

        let frame = Frame {
            function: id,
            kind,
            qualified_name,
            body: parts.body,
            existing_try,
            location,
        };
        if self.is_instrumented(statements) {
            debug!("{}: `{}` is already instrumented", frame.location, frame.qualified_name);
            selection.already_instrumented.push(frame);
        } else {
            debug!("{}: selected {} `{}`", frame.location, frame.kind, frame.qualified_name);
            selection.frames.push(frame);
        }
    }

    fn base_name(&self, parts: &FunctionParts) -> Option<&'a str> {
        if let Some(id) = parts.id {
            return self.arena.identifier_name(id);
        }
        if parts.computed {
            return None;
        }
        let name = match self.arena.kind(parts.key?)? {
            NodeKind::Identifier(ident) => ident.name.as_str(),
            NodeKind::StringLiteral(StringLiteral { value }) => value.as_str(),
            _ => return None,
        };
        (!name.is_empty()).then_some(name)
    }

    /// Method -> `ClassBody` -> class declaration or expression.
    fn enclosing_class_name(&self, method: NodeId) -> Option<&'a str> {
        let class_body = self.arena.find_parent_node(method)?;
        let class = self.arena.find_parent_node(class_body)?;
        let id = match self.arena.kind(class)? {
            NodeKind::ClassDeclaration(decl) => decl.id,
            NodeKind::ClassExpression(expr) => expr.id,
            _ => None,
        };
        self.arena.identifier_name(id?)
    }

    /// `<object>.<prop> = function name() {}` gives the dotted `<object>` name.
    fn assigned_object_name(&self, function: NodeId) -> Option<String> {
        let parent = self.arena.find_parent_node(function)?;
        let NodeKind::AssignmentExpression(AssignmentExpression { left, right, .. }) =
            self.arena.kind(parent)?
        else {
            return None;
        };
        if *right != function {
            return None;
        }
        let NodeKind::MemberExpression(MemberExpression { object, .. }) = self.arena.kind(*left)?
        else {
            return None;
        };
        self.object_path(*object)
    }

    fn object_path(&self, id: NodeId) -> Option<String> {
        match self.arena.kind(id)? {
            NodeKind::Identifier(ident) => Some(ident.name.clone()),
            NodeKind::MemberExpression(MemberExpression {
                object,
                property,
                computed: false,
            }) => {
                let object = self.object_path(*object)?;
                let property = self.arena.identifier_name(*property)?;
                Some(format!("{object}.{property}"))
            }
            _ => None,
        }
    }

    fn catch_clause_of(&self, stmt: NodeId) -> Option<&'a CatchClause> {
        let NodeKind::TryStatement(TryStatement {
            handler: Some(handler),
            ..
        }) = self.arena.kind(stmt)?
        else {
            return None;
        };
        match self.arena.kind(*handler)? {
            NodeKind::CatchClause(clause) => Some(clause),
            _ => None,
        }
    }

    fn is_instrumented(&self, statements: &[NodeId]) -> bool {
        let local = self.config.runtime.local_name.as_str();
        statements.iter().any(|stmt| {
            self.catch_clause_of(*stmt)
                .and_then(|clause| self.arena.kind(clause.body))
                .and_then(NodeKind::as_block)
                .and_then(<[NodeId]>::last)
                .is_some_and(|last| is_generated_fragment(self.arena, *last, local))
        })
    }
}
