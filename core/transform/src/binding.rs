use log::debug;
use pathtrace_ast::{
    arena::Arena,
    builder::Builder,
    errors::AstError,
    nodes::{
        CallExpression, CatchClause, ClassDeclaration, DeclarationKind, FunctionDeclaration,
        ImportDeclaration, ImportDefaultSpecifier, NodeId, NodeKind, Program, StringLiteral,
        TryStatement, VariableDeclarator,
    },
};

use crate::{
    config::{ImportStyle, RuntimeBinding},
    errors::TransformError,
    selector::Frame,
};

/// Prepends the declaration of the carrier constructor to the program body.
///
/// Returns `false` without touching the tree when the program already binds
/// `binding.local_name` to `binding.source`.
///
/// # Errors
///
/// Returns an error if the arena has no program root.
pub fn inject_runtime_binding(
    arena: &mut Arena,
    binding: &RuntimeBinding,
) -> Result<bool, TransformError> {
    let root = arena.root().ok_or(AstError::UnexpectedRoot {
        found: "<none>".to_string(),
    })?;
    let Some(NodeKind::Program(Program { body })) = arena.kind(root) else {
        return Err(AstError::UnexpectedRoot {
            found: arena.node(root)?.type_name().to_string(),
        }
        .into());
    };
    if body.iter().any(|stmt| declares_binding(arena, *stmt, binding)) {
        return Ok(false);
    }

    let mut b = Builder::new(arena);
    let declaration = match binding.style {
        ImportStyle::Require => {
            let require = b.identifier("require");
            let source = b.string_literal(&binding.source);
            let call = b.call(require, vec![source]);
            b.variable_declaration(DeclarationKind::Const, &binding.local_name, Some(call))
        }
        ImportStyle::Import => b.import_default(&binding.local_name, &binding.source),
    };
    arena.modify(root, |kind| {
        if let NodeKind::Program(Program { body }) = kind {
            body.insert(0, declaration);
        }
    })?;
    Ok(true)
}

/// `const <local> = require("<source>")` or `import <local> from "<source>"`.
fn declares_binding(arena: &Arena, stmt: NodeId, binding: &RuntimeBinding) -> bool {
    let is_source = |id: NodeId| {
        matches!(
            arena.kind(id),
            Some(NodeKind::StringLiteral(StringLiteral { value })) if *value == binding.source
        )
    };
    let is_local = |id: NodeId| arena.identifier_name(id) == Some(binding.local_name.as_str());

    match arena.kind(stmt) {
        Some(NodeKind::VariableDeclaration(decl)) => decl.declarations.iter().any(|declarator| {
            let Some(NodeKind::VariableDeclarator(VariableDeclarator {
                id,
                init: Some(init),
            })) = arena.kind(*declarator)
            else {
                return false;
            };
            let Some(NodeKind::CallExpression(CallExpression { callee, arguments })) =
                arena.kind(*init)
            else {
                return false;
            };
            is_local(*id)
                && arena.identifier_name(*callee) == Some("require")
                && arguments.first().copied().is_some_and(is_source)
        }),
        Some(NodeKind::ImportDeclaration(ImportDeclaration { specifiers, source })) => {
            is_source(*source)
                && specifiers.iter().any(|specifier| {
                    matches!(
                        arena.kind(*specifier),
                        Some(NodeKind::ImportDefaultSpecifier(ImportDefaultSpecifier { local }))
                            if is_local(*local)
                    )
                })
        }
        _ => false,
    }
}

/// Finds every binding of `binding.local_name` that would either collide with
/// the injected declaration or shadow it inside one of `frames`.
#[must_use]
pub fn binding_conflicts(
    arena: &Arena,
    binding: &RuntimeBinding,
    frames: &[Frame],
) -> Vec<TransformError> {
    let mut scan = ConflictScan {
        arena,
        binding,
        seen: Vec::new(),
        conflicts: Vec::new(),
    };
    if let Some(root) = arena.root()
        && let Some(NodeKind::Program(Program { body })) = arena.kind(root)
    {
        for stmt in body {
            if !declares_binding(arena, *stmt, binding) {
                scan.declaration(*stmt);
            }
        }
        scan.hoisted_vars(root, true);
    }
    for frame in frames {
        scan.frame(frame);
    }
    scan.conflicts
}

struct ConflictScan<'a> {
    arena: &'a Arena,
    binding: &'a RuntimeBinding,
    seen: Vec<NodeId>,
    conflicts: Vec<TransformError>,
}

impl ConflictScan<'_> {
    fn frame(&mut self, frame: &Frame) {
        let Some(function) = self.arena.kind(frame.function) else {
            return;
        };
        for param in function.function_params() {
            self.pattern(*param);
        }
        if let Some(statements) = self.arena.kind(frame.body).and_then(NodeKind::as_block) {
            for stmt in statements {
                self.declaration(*stmt);
            }
        }
        self.hoisted_vars(frame.body, false);

        // The merged fragment reads the handler's own parameter.
        if let Some(try_stmt) = frame.existing_try
            && let Some(NodeKind::TryStatement(TryStatement {
                handler: Some(handler),
                ..
            })) = self.arena.kind(try_stmt)
            && let Some(NodeKind::CatchClause(CatchClause {
                param: Some(param),
                ..
            })) = self.arena.kind(*handler)
            && self.arena.identifier_name(*param).is_some()
        {
            self.name(*param);
        }
    }

    /// Names a statement binds in the scope it appears in.
    fn declaration(&mut self, stmt: NodeId) {
        match self.arena.kind(stmt) {
            Some(NodeKind::VariableDeclaration(decl)) => {
                for declarator in &decl.declarations {
                    if let Some(NodeKind::VariableDeclarator(VariableDeclarator { id, .. })) =
                        self.arena.kind(*declarator)
                    {
                        self.pattern(*id);
                    }
                }
            }
            Some(
                NodeKind::FunctionDeclaration(FunctionDeclaration { id: Some(id), .. })
                | NodeKind::ClassDeclaration(ClassDeclaration { id: Some(id), .. }),
            ) => self.name(*id),
            Some(NodeKind::ImportDeclaration(ImportDeclaration { specifiers, .. })) => {
                for specifier in specifiers {
                    let local = match self.arena.kind(*specifier) {
                        Some(NodeKind::ImportDefaultSpecifier(ImportDefaultSpecifier { local })) => {
                            Some(*local)
                        }
                        Some(NodeKind::Generic(generic)) => generic.node("local"),
                        _ => None,
                    };
                    if let Some(local) = local {
                        self.name(local);
                    }
                }
            }
            Some(NodeKind::Generic(generic)) if generic.node_type.starts_with("Export") => {
                if let Some(declaration) = generic.node("declaration") {
                    self.declaration(declaration);
                }
            }
            _ => {}
        }
    }

    /// `var` declarations anywhere below `scope`, without entering nested functions.
    fn hoisted_vars(&mut self, scope: NodeId, skip_runtime_binding: bool) {
        let mut stack: Vec<NodeId> = self.arena.children(scope).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            let Some(kind) = self.arena.kind(id) else {
                continue;
            };
            if kind.is_function() {
                continue;
            }
            if let NodeKind::VariableDeclaration(decl) = kind
                && decl.kind == DeclarationKind::Var
                && !(skip_runtime_binding && declares_binding(self.arena, id, self.binding))
            {
                self.declaration(id);
            }
            stack.extend(self.arena.children(id).into_iter().rev());
        }
    }

    /// Identifiers bound by a parameter or declarator pattern.
    fn pattern(&mut self, id: NodeId) {
        match self.arena.kind(id) {
            Some(NodeKind::Identifier(_)) => self.name(id),
            Some(NodeKind::ObjectProperty(prop)) => self.pattern(prop.value),
            Some(NodeKind::Generic(generic)) => {
                for field in ["left", "argument", "elements", "properties", "parameter"] {
                    for child in generic.nodes(field) {
                        self.pattern(child);
                    }
                }
            }
            _ => {}
        }
    }

    fn name(&mut self, id: NodeId) {
        if self.arena.identifier_name(id) != Some(self.binding.local_name.as_str())
            || self.seen.contains(&id)
        {
            return;
        }
        self.seen.push(id);
        let location = self
            .arena
            .get(id)
            .map(|node| node.location.clone())
            .unwrap_or_default();
        debug!("{location}: `{}` is bound here", self.binding.local_name);
        self.conflicts.push(TransformError::BindingConflict {
            name: self.binding.local_name.clone(),
            location,
        });
    }
}
