use core::fmt;
use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

/// Identifier of a node inside an [`Arena`](crate::arena::Arena).
///
/// Zero is reserved and never handed out.
pub type NodeId = u32;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Location {
    pub offset_start: u32,
    pub offset_end: u32,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    #[must_use]
    pub fn new(
        offset_start: u32,
        offset_end: u32,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            offset_start,
            offset_end,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Nodes created by a transform carry no source position.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        *self == Location::default()
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommentKind {
    Block,
    Line,
}

impl CommentKind {
    #[must_use]
    pub fn babel_type(self) -> &'static str {
        match self {
            CommentKind::Block => "CommentBlock",
            CommentKind::Line => "CommentLine",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
    pub location: Location,
}

impl Comment {
    #[must_use]
    pub fn block(value: &str) -> Self {
        Self {
            kind: CommentKind::Block,
            value: value.to_string(),
            location: Location::default(),
        }
    }

    #[must_use]
    pub fn line(value: &str) -> Self {
        Self {
            kind: CommentKind::Line,
            value: value.to_string(),
            location: Location::default(),
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.value.contains(tag)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Comments {
    pub leading: Vec<Comment>,
    pub trailing: Vec<Comment>,
    pub inner: Vec<Comment>,
}

impl Comments {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.inner.is_empty()
    }
}

/// A node stored in the arena.
///
/// `extra` keeps every Babel field the typed [`NodeKind`] does not model
/// (`async`, `static`, `typeAnnotation`, ...) so that export reproduces it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AstNode {
    pub id: NodeId,
    pub location: Location,
    pub comments: Comments,
    pub extra: Map<String, Value>,
    pub kind: NodeKind,
}

impl AstNode {
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }
}

macro_rules! ast_kinds {
    (
        $(
            $(#[$outer:meta])*
            pub struct $name:ident {
                $(
                    $(#[$field_attr:meta])*
                    pub $field_name:ident : $field_ty:ty
                ),* $(,)?
            }
        )+
    ) => {
        $(
            $(#[$outer])*
            #[derive(Clone, PartialEq, Eq, Debug)]
            pub struct $name {
                $(
                    $(#[$field_attr])*
                    pub $field_name : $field_ty,
                )*
            }
        )+

        #[derive(Clone, PartialEq, Eq, Debug)]
        pub enum NodeKind {
            $(
                $name($name),
            )+
            Generic(GenericNode),
        }

        impl NodeKind {
            /// Babel `type` string of this node.
            #[must_use]
            pub fn type_name(&self) -> &str {
                match self {
                    $(
                        NodeKind::$name(_) => stringify!($name),
                    )+
                    NodeKind::Generic(generic) => generic.node_type.as_str(),
                }
            }
        }
    };
}

ast_kinds! {
    pub struct Program {
        pub body: Vec<NodeId>,
    }

    pub struct BlockStatement {
        pub body: Vec<NodeId>,
    }

    pub struct ExpressionStatement {
        pub expression: NodeId,
    }

    pub struct VariableDeclaration {
        pub kind: DeclarationKind,
        pub declarations: Vec<NodeId>,
    }

    pub struct VariableDeclarator {
        pub id: NodeId,
        pub init: Option<NodeId>,
    }

    pub struct ReturnStatement {
        pub argument: Option<NodeId>,
    }

    pub struct ThrowStatement {
        pub argument: NodeId,
    }

    pub struct TryStatement {
        pub block: NodeId,
        pub handler: Option<NodeId>,
        pub finalizer: Option<NodeId>,
    }

    pub struct CatchClause {
        pub param: Option<NodeId>,
        pub body: NodeId,
    }

    pub struct ImportDeclaration {
        pub specifiers: Vec<NodeId>,
        pub source: NodeId,
    }

    pub struct ImportDefaultSpecifier {
        pub local: NodeId,
    }

    pub struct Identifier {
        pub name: String,
    }

    pub struct StringLiteral {
        pub value: String,
    }

    pub struct CallExpression {
        pub callee: NodeId,
        pub arguments: Vec<NodeId>,
    }

    pub struct NewExpression {
        pub callee: NodeId,
        pub arguments: Vec<NodeId>,
    }

    pub struct MemberExpression {
        pub object: NodeId,
        pub property: NodeId,
        pub computed: bool,
    }

    pub struct AssignmentExpression {
        pub operator: String,
        pub left: NodeId,
        pub right: NodeId,
    }

    pub struct BinaryExpression {
        pub operator: String,
        pub left: NodeId,
        pub right: NodeId,
    }

    pub struct ConditionalExpression {
        pub test: NodeId,
        pub consequent: NodeId,
        pub alternate: NodeId,
    }

    pub struct ThisExpression {}

    pub struct FunctionDeclaration {
        pub id: Option<NodeId>,
        pub params: Vec<NodeId>,
        pub body: NodeId,
    }

    pub struct FunctionExpression {
        pub id: Option<NodeId>,
        pub params: Vec<NodeId>,
        pub body: NodeId,
    }

    /// `body` is either a block or a bare expression.
    pub struct ArrowFunctionExpression {
        pub params: Vec<NodeId>,
        pub body: NodeId,
    }

    pub struct ObjectMethod {
        pub key: NodeId,
        pub computed: bool,
        pub params: Vec<NodeId>,
        pub body: NodeId,
    }

    pub struct ClassMethod {
        pub key: NodeId,
        pub computed: bool,
        pub params: Vec<NodeId>,
        pub body: NodeId,
    }

    pub struct ClassDeclaration {
        pub id: Option<NodeId>,
        pub super_class: Option<NodeId>,
        pub body: NodeId,
    }

    pub struct ClassExpression {
        pub id: Option<NodeId>,
        pub super_class: Option<NodeId>,
        pub body: NodeId,
    }

    pub struct ClassBody {
        pub body: Vec<NodeId>,
    }

    pub struct ObjectExpression {
        pub properties: Vec<NodeId>,
    }

    pub struct ObjectProperty {
        pub key: NodeId,
        pub value: NodeId,
        pub computed: bool,
        pub shorthand: bool,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }

    #[must_use]
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "var" => Some(DeclarationKind::Var),
            "let" => Some(DeclarationKind::Let),
            "const" => Some(DeclarationKind::Const),
            _ => None,
        }
    }
}

/// Any node type without a typed representation.
///
/// Fields that hold nodes are still arena children, so traversal reaches
/// functions nested inside e.g. a `ForStatement` or an `ExportNamedDeclaration`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenericNode {
    pub node_type: String,
    pub fields: Vec<(String, Field)>,
}

impl GenericNode {
    /// The node held by a single-node field such as `declaration` or `local`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.fields.iter().find_map(|(key, field)| match field {
            Field::Node(id) if key == name => Some(*id),
            _ => None,
        })
    }

    /// Every node held by `name`, skipping array holes.
    #[must_use]
    pub fn nodes(&self, name: &str) -> Vec<NodeId> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .flat_map(|(_, field)| match field {
                Field::Node(id) => vec![*id],
                Field::Nodes(ids) => ids.iter().flatten().copied().collect(),
                Field::Value(_) => Vec::new(),
            })
            .collect()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Field {
    Node(NodeId),
    Nodes(Vec<Option<NodeId>>),
    Value(Value),
}

/// The pieces of a function-like node the transformer cares about.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FunctionParts {
    pub id: Option<NodeId>,
    pub key: Option<NodeId>,
    pub computed: bool,
    pub body: NodeId,
}

impl NodeKind {
    /// Child node ids in source order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        match self {
            NodeKind::Program(Program { body })
            | NodeKind::BlockStatement(BlockStatement { body })
            | NodeKind::ClassBody(ClassBody { body }) => children.extend(body),
            NodeKind::ExpressionStatement(stmt) => children.push(stmt.expression),
            NodeKind::VariableDeclaration(decl) => children.extend(&decl.declarations),
            NodeKind::VariableDeclarator(decl) => {
                children.push(decl.id);
                children.extend(decl.init);
            }
            NodeKind::ReturnStatement(stmt) => children.extend(stmt.argument),
            NodeKind::ThrowStatement(stmt) => children.push(stmt.argument),
            NodeKind::TryStatement(stmt) => {
                children.push(stmt.block);
                children.extend(stmt.handler);
                children.extend(stmt.finalizer);
            }
            NodeKind::CatchClause(clause) => {
                children.extend(clause.param);
                children.push(clause.body);
            }
            NodeKind::ImportDeclaration(decl) => {
                children.extend(&decl.specifiers);
                children.push(decl.source);
            }
            NodeKind::ImportDefaultSpecifier(spec) => children.push(spec.local),
            NodeKind::Identifier(_)
            | NodeKind::StringLiteral(_)
            | NodeKind::ThisExpression(_) => {}
            NodeKind::CallExpression(CallExpression { callee, arguments })
            | NodeKind::NewExpression(NewExpression { callee, arguments }) => {
                children.push(*callee);
                children.extend(arguments);
            }
            NodeKind::MemberExpression(expr) => {
                children.push(expr.object);
                children.push(expr.property);
            }
            NodeKind::AssignmentExpression(AssignmentExpression { left, right, .. })
            | NodeKind::BinaryExpression(BinaryExpression { left, right, .. }) => {
                children.push(*left);
                children.push(*right);
            }
            NodeKind::ConditionalExpression(expr) => {
                children.push(expr.test);
                children.push(expr.consequent);
                children.push(expr.alternate);
            }
            NodeKind::FunctionDeclaration(FunctionDeclaration { id, params, body })
            | NodeKind::FunctionExpression(FunctionExpression { id, params, body }) => {
                children.extend(*id);
                children.extend(params);
                children.push(*body);
            }
            NodeKind::ArrowFunctionExpression(func) => {
                children.extend(&func.params);
                children.push(func.body);
            }
            NodeKind::ObjectMethod(ObjectMethod {
                key, params, body, ..
            })
            | NodeKind::ClassMethod(ClassMethod {
                key, params, body, ..
            }) => {
                children.push(*key);
                children.extend(params);
                children.push(*body);
            }
            NodeKind::ClassDeclaration(ClassDeclaration {
                id,
                super_class,
                body,
            })
            | NodeKind::ClassExpression(ClassExpression {
                id,
                super_class,
                body,
            }) => {
                children.extend(*id);
                children.extend(*super_class);
                children.push(*body);
            }
            NodeKind::ObjectExpression(expr) => children.extend(&expr.properties),
            NodeKind::ObjectProperty(prop) => {
                children.push(prop.key);
                children.push(prop.value);
            }
            NodeKind::Generic(generic) => {
                for (_, field) in &generic.fields {
                    match field {
                        Field::Node(id) => children.push(*id),
                        Field::Nodes(ids) => children.extend(ids.iter().flatten()),
                        Field::Value(_) => {}
                    }
                }
            }
        }
        children
    }

    /// Returns the name/key/body triple for any function-like kind,
    /// including arrows (which have neither `id` nor `key`).
    #[must_use]
    pub fn function_parts(&self) -> Option<FunctionParts> {
        match self {
            NodeKind::FunctionDeclaration(FunctionDeclaration { id, body, .. })
            | NodeKind::FunctionExpression(FunctionExpression { id, body, .. }) => {
                Some(FunctionParts {
                    id: *id,
                    key: None,
                    computed: false,
                    body: *body,
                })
            }
            NodeKind::ArrowFunctionExpression(func) => Some(FunctionParts {
                id: None,
                key: None,
                computed: false,
                body: func.body,
            }),
            NodeKind::ObjectMethod(ObjectMethod {
                key, computed, body, ..
            })
            | NodeKind::ClassMethod(ClassMethod {
                key, computed, body, ..
            }) => Some(FunctionParts {
                id: None,
                key: Some(*key),
                computed: *computed,
                body: *body,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn function_params(&self) -> &[NodeId] {
        match self {
            NodeKind::FunctionDeclaration(FunctionDeclaration { params, .. })
            | NodeKind::FunctionExpression(FunctionExpression { params, .. })
            | NodeKind::ArrowFunctionExpression(ArrowFunctionExpression { params, .. })
            | NodeKind::ObjectMethod(ObjectMethod { params, .. })
            | NodeKind::ClassMethod(ClassMethod { params, .. }) => params,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        self.function_parts().is_some()
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            NodeKind::Identifier(ident) => Some(ident.name.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_block(&self) -> Option<&[NodeId]> {
        match self {
            NodeKind::BlockStatement(block) => Some(&block.body),
            _ => None,
        }
    }
}
