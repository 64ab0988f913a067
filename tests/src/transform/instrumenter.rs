/// Tests for `Instrumenter::run`
///
/// These tests verify that a run:
/// 1. Rewrites every selected frame and reports it in traversal order
/// 2. Collects every diagnostic before failing, without mutating the tree
/// 3. Refuses to instrument a tree twice
/// 4. Injects the runtime binding exactly once, and only when needed
/// 5. Refuses to run when the runtime name is already bound elsewhere
#[cfg(test)]
mod instrumenter_tests {
    use pathtrace_ast::{
        arena::Arena,
        builder::Builder,
        json,
        nodes::{Comment, NodeKind},
    };
    use pathtrace_transform::{
        ImportStyle, Instrumenter, TransformConfig, frame::FrameShape, selector::FrameKind,
    };

    use crate::utils::{
        call_chain, call_stmt, fragment_reads, function_body, hook_record, instrument,
        program_body, throw_error, try_catch,
    };

    #[test]
    fn test_report_lists_frames_in_order() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        let report = instrument(&mut arena, TransformConfig::default());

        let names: Vec<_> = report
            .frames
            .iter()
            .map(|frame| frame.qualified_name.as_str())
            .collect();
        assert_eq!(names, ["inner", "outer"]);
        assert!(report
            .frames
            .iter()
            .all(|frame| frame.kind == FrameKind::FunctionDeclaration
                && frame.shape == FrameShape::Wrapped { relocated: 0 }));
        assert!(report.runtime_injected);
    }

    #[test]
    fn test_hook_relocation() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let stmt_a = call_stmt(&mut b, "a", &[]);
        let stmt_b = hook_record(&mut b, "err");
        let stmt_c = call_stmt(&mut b, "c", &[]);
        b.trailing_comment(stmt_a, Comment::line(" end of the happy path"));
        let function = b.function_declaration("f", &[], vec![stmt_a, stmt_b, stmt_c]);
        b.program(vec![function]);

        let report = instrument(&mut arena, TransformConfig::default());
        assert_eq!(report.frames[0].shape, FrameShape::Wrapped { relocated: 2 });

        let body = function_body(&arena, function);
        assert_eq!(body.len(), 1);
        let (try_block, param, catch_body) = try_catch(&arena, body[0]);
        assert_eq!(try_block, [stmt_a]);
        assert_eq!(param, "err");
        assert_eq!(catch_body.len(), 3);
        assert_eq!(catch_body[..2], [stmt_b, stmt_c]);
        assert!(matches!(
            arena.kind(catch_body[2]),
            Some(NodeKind::ThrowStatement(_))
        ));

        let output = json::to_string(&arena, false).unwrap();
        assert!(!output.contains("@onError"), "marker comment must be removed");
        assert!(!output.contains("end of the happy path"));
    }

    #[test]
    fn test_only_first_marker_is_honored() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let stmt_a = call_stmt(&mut b, "a", &[]);
        let stmt_b = hook_record(&mut b, "err");
        let stmt_c = hook_record(&mut b, "err");
        let function = b.function_declaration("f", &[], vec![stmt_a, stmt_b, stmt_c]);
        b.program(vec![function]);

        instrument(&mut arena, TransformConfig::default());
        let (try_block, _, catch_body) = try_catch(&arena, function_body(&arena, function)[0]);
        assert_eq!(try_block, [stmt_a]);
        assert_eq!(catch_body[..2], [stmt_b, stmt_c]);
        assert_eq!(
            arena.get(stmt_c).unwrap().comments.leading.len(),
            1,
            "a second marker is left as an ordinary comment"
        );
    }

    #[test]
    fn test_existing_handler_merge() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let x = call_stmt(&mut b, "x", &[]);
        let y = call_stmt(&mut b, "y", &["e"]);
        let try_block = b.block(vec![x]);
        let param = b.identifier("e");
        let catch_block = b.block(vec![y]);
        let handler = b.catch_clause(Some(param), catch_block);
        let finalizer = b.block(vec![]);
        let try_stmt = b.try_statement(try_block, Some(handler), Some(finalizer));
        let after = call_stmt(&mut b, "after", &[]);
        let function = b.function_declaration("f", &[], vec![try_stmt, after]);
        b.program(vec![function]);
        let x_before = arena.get(x).unwrap().clone();

        let report = instrument(&mut arena, TransformConfig::default());
        assert_eq!(
            report.frames[0].shape,
            FrameShape::Merged {
                param: "e".to_string()
            }
        );

        assert_eq!(function_body(&arena, function), [try_stmt, after]);
        let (try_body, param, catch_body) = try_catch(&arena, try_stmt);
        assert_eq!(try_body, [x]);
        assert_eq!(param, "e");
        assert_eq!(catch_body.len(), 2);
        assert_eq!(catch_body[0], y);
        assert_eq!(arena.get(x).unwrap(), &x_before);

        let Some(NodeKind::TryStatement(stmt)) = arena.kind(try_stmt) else {
            panic!("try statement replaced");
        };
        assert_eq!(stmt.finalizer, Some(finalizer));

        assert_eq!(
            fragment_reads(&arena, catch_body[1]),
            ["e", "e", "e"],
            "the rethrow must read the handler's own binding, not `err`"
        );
    }

    #[test]
    fn test_arrow_and_anonymous_functions_untouched() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let throw = throw_error(&mut b, "x");
        let arrow = b.arrow_function(&[], vec![throw]);
        let arrow_stmt = b.expression_statement(arrow);
        let anonymous = b.function_expression(None, &[], vec![]);
        let anonymous_stmt = b.expression_statement(anonymous);
        b.program(vec![arrow_stmt, anonymous_stmt]);
        let before = json::to_json(&arena).unwrap();

        let report = instrument(&mut arena, TransformConfig::default());
        assert!(report.frames.is_empty());
        assert!(!report.runtime_injected);
        assert_eq!(json::to_json(&arena).unwrap(), before);
    }

    #[test]
    fn test_second_run_is_rejected_without_changes() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        instrument(&mut arena, TransformConfig::default());
        let after_first = json::to_json(&arena).unwrap();

        let result = Instrumenter::new(TransformConfig::default()).run(&mut arena);
        let Err(error) = result else {
            panic!("second run should fail");
        };
        let message = error.to_string();
        assert!(
            message.contains("`inner` is already instrumented")
                && message.contains("`outer` is already instrumented"),
            "both frames should be reported, got: {message}"
        );
        assert_eq!(json::to_json(&arena).unwrap(), after_first);
    }

    #[test]
    fn test_diagnostics_are_collected_before_mutation() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let named = b.function_declaration("named", &[], vec![]);
        let first = b.class_method("first", &[], vec![]);
        let second = b.class_method("second", &[], vec![]);
        let class = b.class_expression(None, vec![first, second]);
        let class_stmt = b.expression_statement(class);
        b.program(vec![named, class_stmt]);
        let before = json::to_json(&arena).unwrap();

        let error = Instrumenter::new(TransformConfig::default())
            .run(&mut arena)
            .unwrap_err()
            .to_string();
        assert!(
            error.contains("`first`") && error.contains("`second`") && error.contains("; "),
            "errors should be joined, got: {error}"
        );
        assert_eq!(json::to_json(&arena).unwrap(), before, "tree must be untouched");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        let config = TransformConfig {
            catch_param: "not valid".to_string(),
            ..Default::default()
        };
        let error = Instrumenter::new(config).run(&mut arena).unwrap_err();
        assert!(error.to_string().contains("catchParam"));
    }

    #[test]
    fn test_top_level_binding_conflict_leaves_tree_untouched() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let class = b.class_declaration(Some("PathError"), vec![]);
        let function = b.function_declaration("f", &[], vec![]);
        b.program(vec![class, function]);
        let before = json::to_json(&arena).unwrap();

        let error = Instrumenter::new(TransformConfig::default())
            .run(&mut arena)
            .unwrap_err()
            .to_string();
        assert!(
            error.contains("`PathError` is already declared"),
            "got: {error}"
        );
        assert_eq!(json::to_json(&arena).unwrap(), before);
        assert_eq!(program_body(&arena), [class, function]);
    }

    #[test]
    fn test_frame_locals_shadowing_runtime_are_rejected() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let by_param = b.function_declaration("byParam", &["PathError"], vec![]);
        let value = b.string_literal("shadow");
        let local = b.variable_declaration(
            pathtrace_ast::nodes::DeclarationKind::Const,
            "PathError",
            Some(value),
        );
        let by_local = b.function_declaration("byLocal", &[], vec![local]);
        let try_block = b.block(vec![]);
        let param = b.identifier("PathError");
        let catch_block = b.block(vec![]);
        let handler = b.catch_clause(Some(param), catch_block);
        let try_stmt = b.try_statement(try_block, Some(handler), None);
        let by_handler = b.function_declaration("byHandler", &[], vec![try_stmt]);
        b.program(vec![by_param, by_local, by_handler]);
        let before = json::to_json(&arena).unwrap();

        let error = Instrumenter::new(TransformConfig::default())
            .run(&mut arena)
            .unwrap_err()
            .to_string();
        assert_eq!(
            error.matches("is already declared").count(),
            3,
            "parameter, local and handler binding are each reported, got: {error}"
        );
        assert_eq!(json::to_json(&arena).unwrap(), before);
    }

    #[test]
    fn test_renamed_runtime_local_avoids_conflict() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let class = b.class_declaration(Some("PathError"), vec![]);
        let function = b.function_declaration("f", &[], vec![]);
        b.program(vec![class, function]);

        let mut config = TransformConfig::default();
        config.runtime.local_name = "__PathError".to_string();
        let report = instrument(&mut arena, config);
        assert!(report.runtime_injected);
        assert_eq!(program_body(&arena)[1..], [class, function]);
    }

    #[test]
    fn test_runtime_binding_styles() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        instrument(&mut arena, TransformConfig::default());
        let value = json::to_json(&arena).unwrap();
        let binding = &value["body"][0];
        assert_eq!(binding["type"], "VariableDeclaration");
        assert_eq!(binding["kind"], "const");
        assert_eq!(binding["declarations"][0]["id"]["name"], "PathError");
        assert_eq!(
            binding["declarations"][0]["init"]["arguments"][0]["value"],
            "pathtrace/runtime"
        );

        let mut arena = Arena::new();
        call_chain(&mut arena);
        let mut config = TransformConfig::default();
        config.runtime.style = ImportStyle::Import;
        config.runtime.source = "./runtime.js".to_string();
        instrument(&mut arena, config);
        let first = program_body(&arena)[0];
        let Some(NodeKind::ImportDeclaration(import)) = arena.kind(first) else {
            panic!("expected an import declaration first");
        };
        assert_eq!(import.specifiers.len(), 1);
    }

    #[test]
    fn test_existing_binding_is_reused() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let require = b.identifier("require");
        let source = b.string_literal("pathtrace/runtime");
        let call = b.call(require, vec![source]);
        let binding = b.variable_declaration(
            pathtrace_ast::nodes::DeclarationKind::Const,
            "PathError",
            Some(call),
        );
        let function = b.function_declaration("f", &[], vec![]);
        b.program(vec![binding, function]);

        let report = instrument(&mut arena, TransformConfig::default());
        assert!(!report.runtime_injected);
        assert_eq!(program_body(&arena), [binding, function]);
    }
}
