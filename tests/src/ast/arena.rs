use pathtrace_ast::{
    arena::Arena,
    builder::Builder,
    nodes::{BlockStatement, Location, NodeKind},
};

use crate::utils::{call_stmt, function_body};

#[test]
fn test_ids_start_at_one() {
    let mut arena = Arena::new();
    let id = Builder::new(&mut arena).identifier("x");
    assert_eq!(id, 1);
    assert_eq!(arena.len(), 1);
    assert!(arena.node(0).is_err());
}

#[test]
fn test_parent_lookup() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let stmt = call_stmt(&mut b, "work", &[]);
    let function = b.function_declaration("run", &["input"], vec![stmt]);
    let program = b.program(vec![function]);

    let body = arena
        .kind(function)
        .and_then(NodeKind::function_parts)
        .unwrap()
        .body;
    assert_eq!(arena.find_parent_node(stmt), Some(body));
    assert_eq!(arena.find_parent_node(body), Some(function));
    assert_eq!(arena.find_parent_node(function), Some(program));
    assert_eq!(arena.find_parent_node(program), None);
}

#[test]
fn test_modify_relinks_moved_children() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let stmt = call_stmt(&mut b, "work", &[]);
    let first = b.function_declaration("first", &[], vec![stmt]);
    let second = b.function_declaration("second", &[], vec![]);
    b.program(vec![first, second]);

    let second_body = arena
        .kind(second)
        .and_then(NodeKind::function_parts)
        .unwrap()
        .body;
    arena
        .modify(second_body, |kind| {
            if let NodeKind::BlockStatement(BlockStatement { body }) = kind {
                body.push(stmt);
            }
        })
        .unwrap();
    assert_eq!(arena.find_parent_node(stmt), Some(second_body));
    assert_eq!(function_body(&arena, second), [stmt]);
}

#[test]
fn test_modify_unknown_node_fails() {
    let mut arena = Arena::new();
    let result = arena.modify(42, |_| ());
    assert!(result.is_err(), "modifying a missing node should fail");
}

#[test]
fn test_descendants_are_pre_order() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let inner = b.function_declaration("inner", &[], vec![]);
    let outer = b.function_declaration("outer", &[], vec![inner]);
    let last = b.function_declaration("last", &[], vec![]);
    b.program(vec![outer, last]);

    let functions = arena.filter_nodes(|node| node.kind.is_function());
    assert_eq!(functions, [outer, inner, last]);
}

#[test]
fn test_builder_location() {
    let mut arena = Arena::new();
    let location = Location::new(3, 8, 1, 3, 1, 8);
    let id = Builder::new(&mut arena)
        .with_location(location.clone())
        .identifier("x");
    assert_eq!(arena.get(id).unwrap().location, location);
    assert_eq!(location.to_string(), "1:3");
    assert!(Location::default().is_synthetic());
}
