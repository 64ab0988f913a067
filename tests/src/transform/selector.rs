#[cfg(test)]
mod selector_tests {
    use pathtrace_ast::{arena::Arena, builder::Builder, json};
    use pathtrace_transform::{
        TransformConfig,
        selector::{FrameKind, select_frames},
    };

    use crate::utils::{call_chain, instrument, read_fixture};

    fn names(arena: &Arena, config: &TransformConfig) -> Vec<String> {
        select_frames(arena, config)
            .frames
            .into_iter()
            .map(|frame| frame.qualified_name)
            .collect()
    }

    #[test]
    fn test_qualified_names() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let method = b.class_method("bar", &[], vec![]);
        let class = b.class_declaration(Some("Foo"), vec![method]);

        let obj = b.identifier("obj");
        let target = b.member(obj, "method");
        let handler = b.function_expression(Some("handler"), &[], vec![]);
        let assign = b.assignment(target, handler);
        let assign_stmt = b.expression_statement(assign);

        let object_method = b.object_method("save", &[], vec![]);
        let literal = b.object_expression(vec![object_method]);
        let literal_stmt = b.expression_statement(literal);
        b.program(vec![class, assign_stmt, literal_stmt]);

        assert_eq!(
            names(&arena, &TransformConfig::default()),
            ["Foo -> bar", "obj -> handler", "save"]
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let method = b.class_method("bar", &[], vec![]);
        let class = b.class_declaration(Some("Foo"), vec![method]);
        b.program(vec![class]);

        let config = TransformConfig {
            delimiter: "::".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&arena, &config), ["Foo::bar"]);
    }

    #[test]
    fn test_class_expression_name_is_used() {
        let mut arena = Arena::new();
        let mut b = Builder::new(&mut arena);
        let method = b.class_method("render", &[], vec![]);
        let class = b.class_expression(Some("View"), vec![method]);
        let stmt = b.expression_statement(class);
        b.program(vec![stmt]);

        let selection = select_frames(&arena, &TransformConfig::default());
        assert_eq!(selection.frames[0].qualified_name, "View -> render");
        assert_eq!(selection.frames[0].kind, FrameKind::ClassMethod);
    }

    #[test]
    fn test_generic_parents_are_traversed() {
        let arena = json::from_str(&read_fixture("module.json")).unwrap();
        assert_eq!(
            names(&arena, &TransformConfig::default()),
            ["load", "Store -> save"]
        );
    }

    #[test]
    fn test_instrumented_tree_selects_nothing() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        instrument(&mut arena, TransformConfig::default());

        let selection = select_frames(&arena, &TransformConfig::default());
        assert!(selection.frames.is_empty());
        let already: Vec<_> = selection
            .already_instrumented
            .iter()
            .map(|frame| frame.qualified_name.as_str())
            .collect();
        assert_eq!(already, ["inner", "outer"]);
    }

    #[test]
    fn test_fragment_for_other_binding_is_not_recognised() {
        let mut arena = Arena::new();
        call_chain(&mut arena);
        instrument(&mut arena, TransformConfig::default());

        let mut config = TransformConfig::default();
        config.runtime.local_name = "TracedError".to_string();
        assert_eq!(names(&arena, &config), ["inner", "outer"]);
    }
}
