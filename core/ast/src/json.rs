//! Babel AST JSON import and export.
//!
//! The accepted shape is what `@babel/parser` produces: either a `File`
//! envelope holding a `program`, or a bare `Program`. Node types the arena
//! models are converted into typed [`NodeKind`]s; every other type becomes a
//! [`GenericNode`] whose node-valued fields are still arena children.
//! Fields a typed kind does not model are kept in [`AstNode::extra`] and
//! written back unchanged, so import followed by export loses nothing but
//! the `File`'s token list.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    arena::Arena,
    errors::AstError,
    nodes::{
        ArrowFunctionExpression, AssignmentExpression, AstNode, BinaryExpression, BlockStatement,
        CallExpression, CatchClause, ClassBody, ClassDeclaration, ClassExpression, ClassMethod,
        Comment, CommentKind, Comments, ConditionalExpression, DeclarationKind,
        ExpressionStatement, Field, FunctionDeclaration, FunctionExpression, GenericNode,
        Identifier, ImportDeclaration, ImportDefaultSpecifier, Location, MemberExpression,
        NewExpression, NodeId, NodeKind, ObjectExpression, ObjectMethod, ObjectProperty, Program,
        ReturnStatement, StringLiteral, ThisExpression, ThrowStatement, TryStatement,
        VariableDeclaration, VariableDeclarator,
    },
};

/// Stack headroom kept free before the recursive import and export walks
/// switch to a fresh segment, and the size of each new segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Keys every node may carry that are handled outside the typed kinds.
const COMMON_KEYS: &[&str] = &[
    "type",
    "start",
    "end",
    "loc",
    "range",
    "leadingComments",
    "trailingComments",
    "innerComments",
];

/// Parses Babel AST JSON text into an arena.
///
/// # Errors
///
/// Returns an error if the text is not JSON or the document is not a Babel AST.
///
/// Nesting depth is unbounded: long operator chains and `else if` ladders
/// produce documents far deeper than `serde_json`'s default limit.
pub fn from_str(source: &str) -> Result<Arena, AstError> {
    let mut de = serde_json::Deserializer::from_str(source);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    from_json(&value)
}

/// Converts a Babel `File` or `Program` JSON value into an arena.
///
/// # Errors
///
/// Returns an error on an unexpected root type or a malformed typed node.
pub fn from_json(value: &Value) -> Result<Arena, AstError> {
    let root_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(AstError::MissingType)?;
    let mut importer = Importer {
        arena: Arena::new(),
    };
    let program = match root_type {
        "File" => {
            let program = value.get("program").ok_or(AstError::MissingField {
                node_type: "File".to_string(),
                field: "program",
            })?;
            let mut envelope = value.as_object().cloned().unwrap_or_default();
            envelope.remove("program");
            envelope.remove("tokens");
            importer.arena.file = Some(envelope);
            program
        }
        "Program" => value,
        other => {
            return Err(AstError::UnexpectedRoot {
                found: other.to_string(),
            });
        }
    };
    let program_type = program.get("type").and_then(Value::as_str);
    if program_type != Some("Program") {
        return Err(AstError::UnexpectedRoot {
            found: program_type.unwrap_or("<none>").to_string(),
        });
    }
    let root = importer.node(program)?;
    importer.arena.set_root(root);
    Ok(importer.arena)
}

/// Serializes the arena back into Babel AST JSON text.
///
/// # Errors
///
/// Returns an error if the arena has no root or references a missing node.
pub fn to_string(arena: &Arena, pretty: bool) -> Result<String, AstError> {
    let value = to_json(arena)?;
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

/// Converts the arena back into a Babel JSON value, using the same root
/// shape it was imported from.
///
/// # Errors
///
/// Returns an error if the arena has no root or references a missing node.
pub fn to_json(arena: &Arena) -> Result<Value, AstError> {
    let root = arena.root().ok_or(AstError::UnexpectedRoot {
        found: "<empty arena>".to_string(),
    })?;
    let program = export_node(arena, root)?;
    match &arena.file {
        Some(envelope) => {
            let mut file = envelope.clone();
            file.insert("program".to_string(), program);
            Ok(Value::Object(file))
        }
        None => Ok(program),
    }
}

struct Importer {
    arena: Arena,
}

/// Field reader over one JSON node object that records which keys a typed
/// kind consumed; the rest become `extra`.
struct Fields<'v> {
    node_type: &'v str,
    object: &'v Map<String, Value>,
    consumed: Vec<&'static str>,
    consumed_all: bool,
}

impl<'v> Fields<'v> {
    fn take(&mut self, key: &'static str) -> Option<&'v Value> {
        self.consumed.push(key);
        self.object.get(key).filter(|value| !value.is_null())
    }

    fn string(&mut self, key: &'static str) -> Result<String, AstError> {
        let node_type = self.node_type;
        self.take(key)
            .ok_or(AstError::MissingField {
                node_type: node_type.to_string(),
                field: key,
            })?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AstError::InvalidField {
                node_type: node_type.to_string(),
                field: key.to_string(),
                reason: "expected a string".to_string(),
            })
    }

    fn flag(&mut self, key: &'static str) -> bool {
        self.take(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn extra(self) -> Map<String, Value> {
        if self.consumed_all {
            return Map::new();
        }
        self.object
            .iter()
            .filter(|(key, _)| {
                !COMMON_KEYS.contains(&key.as_str()) && !self.consumed.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl Importer {
    fn node(&mut self, value: &Value) -> Result<NodeId, AstError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.import_node(value))
    }

    fn import_node(&mut self, value: &Value) -> Result<NodeId, AstError> {
        let object = value.as_object().ok_or(AstError::MissingType)?;
        let node_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(AstError::MissingType)?;
        let mut fields = Fields {
            node_type,
            object,
            consumed: Vec::new(),
            consumed_all: false,
        };
        let kind = self.kind(node_type, &mut fields)?;
        let extra = fields.extra();
        Ok(self
            .arena
            .alloc_with(location_of(object), comments_of(object), extra, kind))
    }

    fn required(&mut self, fields: &mut Fields, key: &'static str) -> Result<NodeId, AstError> {
        let value = fields.take(key).ok_or(AstError::MissingField {
            node_type: fields.node_type.to_string(),
            field: key,
        })?;
        self.node(value)
    }

    fn optional(
        &mut self,
        fields: &mut Fields,
        key: &'static str,
    ) -> Result<Option<NodeId>, AstError> {
        fields.take(key).map(|value| self.node(value)).transpose()
    }

    fn list(&mut self, fields: &mut Fields, key: &'static str) -> Result<Vec<NodeId>, AstError> {
        let Some(value) = fields.take(key) else {
            return Ok(Vec::new());
        };
        let items = value.as_array().ok_or_else(|| AstError::InvalidField {
            node_type: fields.node_type.to_string(),
            field: key.to_string(),
            reason: "expected an array".to_string(),
        })?;
        items.iter().map(|item| self.node(item)).collect()
    }

    #[allow(clippy::too_many_lines)]
    fn kind(&mut self, node_type: &str, f: &mut Fields) -> Result<NodeKind, AstError> {
        let kind = match node_type {
            "Program" => NodeKind::Program(Program {
                body: self.list(f, "body")?,
            }),
            "BlockStatement" => NodeKind::BlockStatement(BlockStatement {
                body: self.list(f, "body")?,
            }),
            "ExpressionStatement" => NodeKind::ExpressionStatement(ExpressionStatement {
                expression: self.required(f, "expression")?,
            }),
            "VariableDeclaration" if declaration_kind(f.object).is_some() => {
                let kind = declaration_kind(f.object).unwrap_or(DeclarationKind::Var);
                f.take("kind");
                NodeKind::VariableDeclaration(VariableDeclaration {
                    kind,
                    declarations: self.list(f, "declarations")?,
                })
            }
            "VariableDeclarator" => NodeKind::VariableDeclarator(VariableDeclarator {
                id: self.required(f, "id")?,
                init: self.optional(f, "init")?,
            }),
            "ReturnStatement" => NodeKind::ReturnStatement(ReturnStatement {
                argument: self.optional(f, "argument")?,
            }),
            "ThrowStatement" => NodeKind::ThrowStatement(ThrowStatement {
                argument: self.required(f, "argument")?,
            }),
            "TryStatement" => NodeKind::TryStatement(TryStatement {
                block: self.required(f, "block")?,
                handler: self.optional(f, "handler")?,
                finalizer: self.optional(f, "finalizer")?,
            }),
            "CatchClause" => NodeKind::CatchClause(CatchClause {
                param: self.optional(f, "param")?,
                body: self.required(f, "body")?,
            }),
            "ImportDeclaration" => NodeKind::ImportDeclaration(ImportDeclaration {
                specifiers: self.list(f, "specifiers")?,
                source: self.required(f, "source")?,
            }),
            "ImportDefaultSpecifier" => NodeKind::ImportDefaultSpecifier(ImportDefaultSpecifier {
                local: self.required(f, "local")?,
            }),
            "Identifier" => NodeKind::Identifier(Identifier {
                name: f.string("name")?,
            }),
            "StringLiteral" => NodeKind::StringLiteral(StringLiteral {
                value: f.string("value")?,
            }),
            "CallExpression" => NodeKind::CallExpression(CallExpression {
                callee: self.required(f, "callee")?,
                arguments: self.list(f, "arguments")?,
            }),
            "NewExpression" => NodeKind::NewExpression(NewExpression {
                callee: self.required(f, "callee")?,
                arguments: self.list(f, "arguments")?,
            }),
            "MemberExpression" => NodeKind::MemberExpression(MemberExpression {
                object: self.required(f, "object")?,
                property: self.required(f, "property")?,
                computed: f.flag("computed"),
            }),
            "AssignmentExpression" => {
                let operator = f.string("operator")?;
                NodeKind::AssignmentExpression(AssignmentExpression {
                    operator,
                    left: self.required(f, "left")?,
                    right: self.required(f, "right")?,
                })
            }
            "BinaryExpression" => {
                let operator = f.string("operator")?;
                NodeKind::BinaryExpression(BinaryExpression {
                    operator,
                    left: self.required(f, "left")?,
                    right: self.required(f, "right")?,
                })
            }
            "ConditionalExpression" => NodeKind::ConditionalExpression(ConditionalExpression {
                test: self.required(f, "test")?,
                consequent: self.required(f, "consequent")?,
                alternate: self.required(f, "alternate")?,
            }),
            "ThisExpression" => NodeKind::ThisExpression(ThisExpression {}),
            "FunctionDeclaration" => NodeKind::FunctionDeclaration(FunctionDeclaration {
                id: self.optional(f, "id")?,
                params: self.list(f, "params")?,
                body: self.required(f, "body")?,
            }),
            "FunctionExpression" => NodeKind::FunctionExpression(FunctionExpression {
                id: self.optional(f, "id")?,
                params: self.list(f, "params")?,
                body: self.required(f, "body")?,
            }),
            "ArrowFunctionExpression" => {
                NodeKind::ArrowFunctionExpression(ArrowFunctionExpression {
                    params: self.list(f, "params")?,
                    body: self.required(f, "body")?,
                })
            }
            "ObjectMethod" => {
                let computed = f.flag("computed");
                NodeKind::ObjectMethod(ObjectMethod {
                    key: self.required(f, "key")?,
                    computed,
                    params: self.list(f, "params")?,
                    body: self.required(f, "body")?,
                })
            }
            "ClassMethod" => {
                let computed = f.flag("computed");
                NodeKind::ClassMethod(ClassMethod {
                    key: self.required(f, "key")?,
                    computed,
                    params: self.list(f, "params")?,
                    body: self.required(f, "body")?,
                })
            }
            "ClassDeclaration" => NodeKind::ClassDeclaration(ClassDeclaration {
                id: self.optional(f, "id")?,
                super_class: self.optional(f, "superClass")?,
                body: self.required(f, "body")?,
            }),
            "ClassExpression" => NodeKind::ClassExpression(ClassExpression {
                id: self.optional(f, "id")?,
                super_class: self.optional(f, "superClass")?,
                body: self.required(f, "body")?,
            }),
            "ClassBody" => NodeKind::ClassBody(ClassBody {
                body: self.list(f, "body")?,
            }),
            "ObjectExpression" => NodeKind::ObjectExpression(ObjectExpression {
                properties: self.list(f, "properties")?,
            }),
            "ObjectProperty" => {
                let computed = f.flag("computed");
                let shorthand = f.flag("shorthand");
                NodeKind::ObjectProperty(ObjectProperty {
                    key: self.required(f, "key")?,
                    value: self.required(f, "value")?,
                    computed,
                    shorthand,
                })
            }
            _ => NodeKind::Generic(self.generic(node_type, f)?),
        };
        Ok(kind)
    }

    fn generic(&mut self, node_type: &str, f: &mut Fields) -> Result<GenericNode, AstError> {
        let mut fields = Vec::new();
        for (key, value) in f.object {
            if COMMON_KEYS.contains(&key.as_str()) {
                continue;
            }
            let field = if is_node(value) {
                Field::Node(self.node(value)?)
            } else if is_node_list(value) {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    ids.push(if item.is_null() {
                        None
                    } else {
                        Some(self.node(item)?)
                    });
                }
                Field::Nodes(ids)
            } else {
                Field::Value(value.clone())
            };
            fields.push((key.clone(), field));
        }
        // Every key now lives in `fields`; nothing is left for `extra`.
        f.consumed_all = true;
        log::trace!("imported `{node_type}` as a generic node");
        Ok(GenericNode {
            node_type: node_type.to_string(),
            fields,
        })
    }
}

fn declaration_kind(object: &Map<String, Value>) -> Option<DeclarationKind> {
    object
        .get("kind")
        .and_then(Value::as_str)
        .and_then(DeclarationKind::parse)
}

fn is_node(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

fn is_node_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| {
        !items.is_empty()
            && items.iter().any(is_node)
            && items.iter().all(|item| item.is_null() || is_node(item))
    })
}

fn number(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default()
}

fn location_of(object: &Map<String, Value>) -> Location {
    let loc = object.get("loc");
    let position = |edge: &str, axis: &str| {
        number(
            loc.and_then(|l| l.get(edge))
                .and_then(|point| point.get(axis)),
        )
    };
    Location::new(
        number(object.get("start")),
        number(object.get("end")),
        position("start", "line"),
        position("start", "column"),
        position("end", "line"),
        position("end", "column"),
    )
}

fn comment_list(object: &Map<String, Value>, key: &str) -> Vec<Comment> {
    let Some(items) = object.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let kind = match item.get("type").and_then(Value::as_str)? {
                "CommentBlock" => CommentKind::Block,
                "CommentLine" => CommentKind::Line,
                _ => return None,
            };
            let value = item.get("value").and_then(Value::as_str)?.to_string();
            let location = item.as_object().map(location_of).unwrap_or_default();
            Some(Comment {
                kind,
                value,
                location,
            })
        })
        .collect()
}

fn comments_of(object: &Map<String, Value>) -> Comments {
    Comments {
        leading: comment_list(object, "leadingComments"),
        trailing: comment_list(object, "trailingComments"),
        inner: comment_list(object, "innerComments"),
    }
}

fn write_location(out: &mut Map<String, Value>, location: &Location) {
    if location.is_synthetic() {
        return;
    }
    out.insert("start".to_string(), Value::from(location.offset_start));
    out.insert("end".to_string(), Value::from(location.offset_end));
    out.insert(
        "loc".to_string(),
        serde_json::json!({
            "start": { "line": location.start_line, "column": location.start_column },
            "end": { "line": location.end_line, "column": location.end_column },
        }),
    );
}

fn export_comments(comments: &[Comment]) -> Value {
    Value::Array(
        comments
            .iter()
            .map(|comment| {
                let mut out = Map::new();
                out.insert("type".to_string(), Value::from(comment.kind.babel_type()));
                out.insert("value".to_string(), Value::from(comment.value.as_str()));
                write_location(&mut out, &comment.location);
                Value::Object(out)
            })
            .collect(),
    )
}

fn write_comments(out: &mut Map<String, Value>, comments: &Comments) {
    for (key, list) in [
        ("leadingComments", &comments.leading),
        ("trailingComments", &comments.trailing),
        ("innerComments", &comments.inner),
    ] {
        if !list.is_empty() {
            out.insert(key.to_string(), export_comments(list));
        }
    }
}

struct Writer<'a> {
    arena: &'a Arena,
    out: Map<String, Value>,
}

impl Writer<'_> {
    fn node(&mut self, key: &str, id: NodeId) -> Result<(), AstError> {
        let value = export_node(self.arena, id)?;
        self.out.insert(key.to_string(), value);
        Ok(())
    }

    fn optional(&mut self, key: &str, id: Option<NodeId>) -> Result<(), AstError> {
        match id {
            Some(id) => self.node(key, id),
            None => {
                self.out.insert(key.to_string(), Value::Null);
                Ok(())
            }
        }
    }

    fn list(&mut self, key: &str, ids: &[NodeId]) -> Result<(), AstError> {
        let items = ids
            .iter()
            .map(|id| export_node(self.arena, *id))
            .collect::<Result<Vec<_>, _>>()?;
        self.out.insert(key.to_string(), Value::Array(items));
        Ok(())
    }

    fn value(&mut self, key: &str, value: impl Into<Value>) {
        self.out.insert(key.to_string(), value.into());
    }
}

#[allow(clippy::too_many_lines)]
fn export_node(arena: &Arena, id: NodeId) -> Result<Value, AstError> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || write_node(arena, id))
}

fn write_node(arena: &Arena, id: NodeId) -> Result<Value, AstError> {
    let node: &AstNode = arena.node(id)?;
    let mut w = Writer {
        arena,
        out: Map::new(),
    };
    w.value("type", node.type_name());
    match &node.kind {
        NodeKind::Program(Program { body })
        | NodeKind::BlockStatement(BlockStatement { body })
        | NodeKind::ClassBody(ClassBody { body }) => w.list("body", body)?,
        NodeKind::ExpressionStatement(stmt) => w.node("expression", stmt.expression)?,
        NodeKind::VariableDeclaration(decl) => {
            w.value("kind", decl.kind.as_str());
            w.list("declarations", &decl.declarations)?;
        }
        NodeKind::VariableDeclarator(decl) => {
            w.node("id", decl.id)?;
            w.optional("init", decl.init)?;
        }
        NodeKind::ReturnStatement(stmt) => w.optional("argument", stmt.argument)?,
        NodeKind::ThrowStatement(stmt) => w.node("argument", stmt.argument)?,
        NodeKind::TryStatement(stmt) => {
            w.node("block", stmt.block)?;
            w.optional("handler", stmt.handler)?;
            w.optional("finalizer", stmt.finalizer)?;
        }
        NodeKind::CatchClause(clause) => {
            w.optional("param", clause.param)?;
            w.node("body", clause.body)?;
        }
        NodeKind::ImportDeclaration(decl) => {
            w.list("specifiers", &decl.specifiers)?;
            w.node("source", decl.source)?;
        }
        NodeKind::ImportDefaultSpecifier(spec) => w.node("local", spec.local)?,
        NodeKind::Identifier(ident) => w.value("name", ident.name.as_str()),
        NodeKind::StringLiteral(lit) => w.value("value", lit.value.as_str()),
        NodeKind::CallExpression(CallExpression { callee, arguments })
        | NodeKind::NewExpression(NewExpression { callee, arguments }) => {
            w.node("callee", *callee)?;
            w.list("arguments", arguments)?;
        }
        NodeKind::MemberExpression(expr) => {
            w.node("object", expr.object)?;
            w.node("property", expr.property)?;
            w.value("computed", expr.computed);
        }
        NodeKind::AssignmentExpression(AssignmentExpression {
            operator,
            left,
            right,
        })
        | NodeKind::BinaryExpression(BinaryExpression {
            operator,
            left,
            right,
        }) => {
            w.value("operator", operator.as_str());
            w.node("left", *left)?;
            w.node("right", *right)?;
        }
        NodeKind::ConditionalExpression(expr) => {
            w.node("test", expr.test)?;
            w.node("consequent", expr.consequent)?;
            w.node("alternate", expr.alternate)?;
        }
        NodeKind::ThisExpression(_) => {}
        NodeKind::FunctionDeclaration(FunctionDeclaration { id, params, body })
        | NodeKind::FunctionExpression(FunctionExpression { id, params, body }) => {
            w.optional("id", *id)?;
            w.list("params", params)?;
            w.node("body", *body)?;
        }
        NodeKind::ArrowFunctionExpression(func) => {
            w.list("params", &func.params)?;
            w.node("body", func.body)?;
        }
        NodeKind::ObjectMethod(ObjectMethod {
            key,
            computed,
            params,
            body,
        })
        | NodeKind::ClassMethod(ClassMethod {
            key,
            computed,
            params,
            body,
        }) => {
            w.node("key", *key)?;
            w.value("computed", *computed);
            w.list("params", params)?;
            w.node("body", *body)?;
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
            w.optional("id", *id)?;
            w.optional("superClass", *super_class)?;
            w.node("body", *body)?;
        }
        NodeKind::ObjectExpression(expr) => w.list("properties", &expr.properties)?,
        NodeKind::ObjectProperty(prop) => {
            w.node("key", prop.key)?;
            w.node("value", prop.value)?;
            w.value("computed", prop.computed);
            w.value("shorthand", prop.shorthand);
        }
        NodeKind::Generic(generic) => {
            for (key, field) in &generic.fields {
                match field {
                    Field::Node(child) => w.node(key, *child)?,
                    Field::Nodes(children) => {
                        let items = children
                            .iter()
                            .map(|child| match child {
                                Some(child) => export_node(arena, *child),
                                None => Ok(Value::Null),
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        w.value(key, Value::Array(items));
                    }
                    Field::Value(value) => w.value(key, value.clone()),
                }
            }
        }
    }
    let mut out = w.out;
    for (key, value) in &node.extra {
        out.entry(key.clone()).or_insert_with(|| value.clone());
    }
    write_location(&mut out, &node.location);
    write_comments(&mut out, &node.comments);
    Ok(Value::Object(out))
}
