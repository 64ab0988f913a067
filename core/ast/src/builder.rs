//! Typed node constructors over an [`Arena`].
//!
//! The `Builder` is how new nodes enter a tree after import: the transformer
//! builds its generated catch fragment with it and the test suite builds
//! fixture programs with it. Every constructor allocates through
//! [`Arena::alloc_with`], so parent routes of the children are linked as the
//! node is created.
//!
//! # Example
//!
//! ```
//! use pathtrace_ast::{arena::Arena, builder::Builder};
//!
//! let mut arena = Arena::new();
//! let mut b = Builder::new(&mut arena);
//! let message = b.string_literal("boom");
//! let error = b.identifier("Error");
//! let new_error = b.new_expression(error, vec![message]);
//! let throw = b.throw_statement(new_error);
//! let inner = b.function_declaration("inner", &[], vec![throw]);
//! let program = b.program(vec![inner]);
//! assert_eq!(arena.root(), Some(program));
//! ```

use serde_json::{Map, Value};

use crate::{
    arena::Arena,
    nodes::{
        ArrowFunctionExpression, AssignmentExpression, BinaryExpression, BlockStatement,
        CallExpression, CatchClause, ClassBody, ClassDeclaration, ClassExpression, ClassMethod,
        Comment, Comments, ConditionalExpression, DeclarationKind, ExpressionStatement,
        FunctionDeclaration, FunctionExpression, Identifier, ImportDeclaration,
        ImportDefaultSpecifier, Location, MemberExpression, NewExpression, NodeId, NodeKind,
        ObjectExpression, ObjectMethod, ObjectProperty, Program, ReturnStatement, StringLiteral,
        ThisExpression, ThrowStatement, TryStatement, VariableDeclaration, VariableDeclarator,
    },
};

pub struct Builder<'a> {
    arena: &'a mut Arena,
    location: Location,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(arena: &'a mut Arena) -> Self {
        Self {
            arena,
            location: Location::default(),
        }
    }

    /// Nodes built afterwards carry `location` instead of the synthetic default.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    fn add(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(self.location.clone(), kind)
    }

    fn add_with_extra(&mut self, kind: NodeKind, extra: Map<String, Value>) -> NodeId {
        self.arena
            .alloc_with(self.location.clone(), Comments::default(), extra, kind)
    }

    pub fn program(&mut self, body: Vec<NodeId>) -> NodeId {
        let mut extra = Map::new();
        extra.insert("sourceType".to_string(), Value::from("script"));
        extra.insert("directives".to_string(), Value::Array(Vec::new()));
        let id = self.add_with_extra(NodeKind::Program(Program { body }), extra);
        self.arena.set_root(id);
        id
    }

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.add(NodeKind::Identifier(Identifier {
            name: name.to_string(),
        }))
    }

    pub fn string_literal(&mut self, value: &str) -> NodeId {
        self.add(NodeKind::StringLiteral(StringLiteral {
            value: value.to_string(),
        }))
    }

    pub fn this_expression(&mut self) -> NodeId {
        self.add(NodeKind::ThisExpression(ThisExpression {}))
    }

    /// `object.property` with a non-computed identifier property.
    pub fn member(&mut self, object: NodeId, property: &str) -> NodeId {
        let property = self.identifier(property);
        self.add(NodeKind::MemberExpression(MemberExpression {
            object,
            property,
            computed: false,
        }))
    }

    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::CallExpression(CallExpression { callee, arguments }))
    }

    pub fn new_expression(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::NewExpression(NewExpression { callee, arguments }))
    }

    pub fn binary(&mut self, operator: &str, left: NodeId, right: NodeId) -> NodeId {
        self.add(NodeKind::BinaryExpression(BinaryExpression {
            operator: operator.to_string(),
            left,
            right,
        }))
    }

    pub fn assignment(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add(NodeKind::AssignmentExpression(AssignmentExpression {
            operator: "=".to_string(),
            left,
            right,
        }))
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.add(NodeKind::ConditionalExpression(ConditionalExpression {
            test,
            consequent,
            alternate,
        }))
    }

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.add(NodeKind::ExpressionStatement(ExpressionStatement {
            expression,
        }))
    }

    pub fn block(&mut self, body: Vec<NodeId>) -> NodeId {
        let mut extra = Map::new();
        extra.insert("directives".to_string(), Value::Array(Vec::new()));
        self.add_with_extra(NodeKind::BlockStatement(BlockStatement { body }), extra)
    }

    pub fn return_statement(&mut self, argument: Option<NodeId>) -> NodeId {
        self.add(NodeKind::ReturnStatement(ReturnStatement { argument }))
    }

    pub fn throw_statement(&mut self, argument: NodeId) -> NodeId {
        self.add(NodeKind::ThrowStatement(ThrowStatement { argument }))
    }

    pub fn try_statement(
        &mut self,
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    ) -> NodeId {
        self.add(NodeKind::TryStatement(TryStatement {
            block,
            handler,
            finalizer,
        }))
    }

    pub fn catch_clause(&mut self, param: Option<NodeId>, body: NodeId) -> NodeId {
        self.add(NodeKind::CatchClause(CatchClause { param, body }))
    }

    /// `<kind> <name> = <init>;` with a single declarator.
    pub fn variable_declaration(
        &mut self,
        kind: DeclarationKind,
        name: &str,
        init: Option<NodeId>,
    ) -> NodeId {
        let id = self.identifier(name);
        let declarator = self.add(NodeKind::VariableDeclarator(VariableDeclarator { id, init }));
        self.add(NodeKind::VariableDeclaration(VariableDeclaration {
            kind,
            declarations: vec![declarator],
        }))
    }

    /// `import <local> from "<source>";`
    pub fn import_default(&mut self, local: &str, source: &str) -> NodeId {
        let local = self.identifier(local);
        let specifier = self.add(NodeKind::ImportDefaultSpecifier(ImportDefaultSpecifier {
            local,
        }));
        let source = self.string_literal(source);
        let mut extra = Map::new();
        extra.insert("importKind".to_string(), Value::from("value"));
        self.add_with_extra(
            NodeKind::ImportDeclaration(ImportDeclaration {
                specifiers: vec![specifier],
                source,
            }),
            extra,
        )
    }

    fn params(&mut self, params: &[&str]) -> Vec<NodeId> {
        params.iter().map(|name| self.identifier(name)).collect()
    }

    fn function_extra() -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("async".to_string(), Value::Bool(false));
        extra.insert("generator".to_string(), Value::Bool(false));
        extra
    }

    pub fn function_declaration(
        &mut self,
        name: &str,
        params: &[&str],
        body: Vec<NodeId>,
    ) -> NodeId {
        let id = self.identifier(name);
        let params = self.params(params);
        let body = self.block(body);
        self.add_with_extra(
            NodeKind::FunctionDeclaration(FunctionDeclaration {
                id: Some(id),
                params,
                body,
            }),
            Self::function_extra(),
        )
    }

    pub fn function_expression(
        &mut self,
        name: Option<&str>,
        params: &[&str],
        body: Vec<NodeId>,
    ) -> NodeId {
        let id = name.map(|name| self.identifier(name));
        let params = self.params(params);
        let body = self.block(body);
        self.add_with_extra(
            NodeKind::FunctionExpression(FunctionExpression { id, params, body }),
            Self::function_extra(),
        )
    }

    pub fn arrow_function(&mut self, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let params = self.params(params);
        let body = self.block(body);
        self.add_with_extra(
            NodeKind::ArrowFunctionExpression(ArrowFunctionExpression { params, body }),
            Self::function_extra(),
        )
    }

    pub fn object_expression(&mut self, properties: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::ObjectExpression(ObjectExpression { properties }))
    }

    pub fn object_property(&mut self, key: &str, value: NodeId) -> NodeId {
        let key = self.identifier(key);
        self.add(NodeKind::ObjectProperty(ObjectProperty {
            key,
            value,
            computed: false,
            shorthand: false,
        }))
    }

    pub fn object_method(&mut self, key: &str, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let key = self.identifier(key);
        let params = self.params(params);
        let body = self.block(body);
        let mut extra = Self::function_extra();
        extra.insert("kind".to_string(), Value::from("method"));
        self.add_with_extra(
            NodeKind::ObjectMethod(ObjectMethod {
                key,
                computed: false,
                params,
                body,
            }),
            extra,
        )
    }

    pub fn class_method(&mut self, key: &str, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let key = self.identifier(key);
        let params = self.params(params);
        let body = self.block(body);
        let mut extra = Self::function_extra();
        extra.insert("kind".to_string(), Value::from("method"));
        extra.insert("static".to_string(), Value::Bool(false));
        self.add_with_extra(
            NodeKind::ClassMethod(ClassMethod {
                key,
                computed: false,
                params,
                body,
            }),
            extra,
        )
    }

    pub fn class_declaration(&mut self, name: Option<&str>, members: Vec<NodeId>) -> NodeId {
        let id = name.map(|name| self.identifier(name));
        let body = self.add(NodeKind::ClassBody(ClassBody { body: members }));
        self.add(NodeKind::ClassDeclaration(ClassDeclaration {
            id,
            super_class: None,
            body,
        }))
    }

    pub fn class_expression(&mut self, name: Option<&str>, members: Vec<NodeId>) -> NodeId {
        let id = name.map(|name| self.identifier(name));
        let body = self.add(NodeKind::ClassBody(ClassBody { body: members }));
        self.add(NodeKind::ClassExpression(ClassExpression {
            id,
            super_class: None,
            body,
        }))
    }

    /// Attaches a leading comment to an already built node.
    pub fn leading_comment(&mut self, id: NodeId, comment: Comment) {
        if let Some(node) = self.arena.get_mut(id) {
            node.comments.leading.push(comment);
        }
    }

    pub fn trailing_comment(&mut self, id: NodeId, comment: Comment) {
        if let Some(node) = self.arena.get_mut(id) {
            node.comments.trailing.push(comment);
        }
    }
}
