//! Instruments small programs and runs them through the test evaluator to
//! check the function path an escaping error ends up with.

use pathtrace::{ChainOrder, TransformConfig};
use pathtrace_ast::{arena::Arena, builder::Builder};
use pathtrace_runtime::{Caught, rethrow};

use crate::evaluator::Interpreter;
use crate::utils::{
    call_chain, call_stmt, hook_record, instrument, method_call_stmt, read_fixture, throw_error,
    uncaught,
};

fn path_of(caught: &Caught) -> &str {
    match caught {
        Caught::PathAnnotated(carrier) => carrier.function_path(),
        Caught::Plain(plain) => panic!("expected a carrier, caught {plain:?}"),
    }
}

#[test]
fn test_uninstrumented_error_is_plain() {
    let mut arena = Arena::new();
    call_chain(&mut arena);
    let thrown = uncaught(&arena);
    assert_eq!(thrown.class_name().as_deref(), Some("Error"));
    assert_eq!(thrown.to_caught(), Caught::plain("boom"));
}

#[test]
fn test_call_chain_outer_first() {
    let mut arena = Arena::new();
    call_chain(&mut arena);
    instrument(&mut arena, TransformConfig::default());

    let caught = uncaught(&arena).to_caught();
    assert_eq!(path_of(&caught), "outer -> inner");
    assert_eq!(caught.message(), "boom");
}

#[test]
fn test_call_chain_inner_first() {
    let mut arena = Arena::new();
    call_chain(&mut arena);
    let config = TransformConfig {
        chain_order: ChainOrder::InnerFirst,
        ..Default::default()
    };
    instrument(&mut arena, config);

    assert_eq!(path_of(&uncaught(&arena).to_caught()), "inner -> outer");
}

#[test]
fn test_hook_observes_inner_carrier() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let throw = throw_error(&mut b, "boom");
    let inner = b.function_declaration("inner", &[], vec![throw]);
    let call_inner = call_stmt(&mut b, "inner", &[]);
    let hook = hook_record(&mut b, "err");
    let outer = b.function_declaration("outer", &[], vec![call_inner, hook]);
    let call_outer = call_stmt(&mut b, "outer", &[]);
    b.program(vec![inner, outer, call_outer]);
    instrument(&mut arena, TransformConfig::default());

    let interpreter = Interpreter::new(&arena);
    let thrown = interpreter.run().expect_err("outer should rethrow");
    let recorded = interpreter.recorded();
    assert_eq!(recorded.len(), 1, "the hook runs once, on the error path");
    assert_eq!(path_of(&recorded[0].to_caught()), "inner");
    assert_eq!(path_of(&thrown.to_caught()), "outer -> inner");
}

#[test]
fn test_existing_handler_rethrows_its_own_binding() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let throw = throw_error(&mut b, "boom");
    let inner = b.function_declaration("inner", &[], vec![throw]);
    let call_inner = call_stmt(&mut b, "inner", &[]);
    let try_block = b.block(vec![call_inner]);
    let param = b.identifier("e");
    let record = call_stmt(&mut b, "record", &["e"]);
    let catch_block = b.block(vec![record]);
    let handler = b.catch_clause(Some(param), catch_block);
    let try_stmt = b.try_statement(try_block, Some(handler), None);
    let outer = b.function_declaration("outer", &[], vec![try_stmt]);
    let call_outer = call_stmt(&mut b, "outer", &[]);
    b.program(vec![inner, outer, call_outer]);
    instrument(&mut arena, TransformConfig::default());

    let interpreter = Interpreter::new(&arena);
    let thrown = interpreter.run().expect_err("outer should rethrow");
    let recorded = interpreter.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(path_of(&recorded[0].to_caught()), "inner");
    let caught = thrown.to_caught();
    assert_eq!(path_of(&caught), "outer -> inner");
    assert_eq!(caught.message(), "boom");
}

#[test]
fn test_hook_does_not_run_on_success() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let work = b.function_declaration("work", &[], vec![]);
    let call_work = call_stmt(&mut b, "work", &[]);
    let hook = hook_record(&mut b, "err");
    let run = b.function_declaration("run", &[], vec![call_work, hook]);
    let call_run = call_stmt(&mut b, "run", &[]);
    b.program(vec![work, run, call_run]);
    instrument(&mut arena, TransformConfig::default());

    let interpreter = Interpreter::new(&arena);
    assert!(interpreter.run().is_ok());
    assert!(interpreter.recorded().is_empty());
}

#[test]
fn test_class_method_path() {
    let mut arena = Arena::new();
    let mut b = Builder::new(&mut arena);
    let throw = throw_error(&mut b, "nope");
    let method = b.class_method("bar", &[], vec![throw]);
    let class = b.class_declaration(Some("Foo"), vec![method]);
    let foo = b.identifier("Foo");
    let instance = b.new_expression(foo, vec![]);
    let declaration = b.variable_declaration(
        pathtrace_ast::nodes::DeclarationKind::Const,
        "foo",
        Some(instance),
    );
    let call = method_call_stmt(&mut b, "foo", "bar");
    let main = b.function_declaration("main", &[], vec![declaration, call]);
    let call_main = call_stmt(&mut b, "main", &[]);
    b.program(vec![class, main, call_main]);
    instrument(&mut arena, TransformConfig::default());

    let caught = uncaught(&arena).to_caught();
    assert_eq!(path_of(&caught), "main -> Foo -> bar");
    assert_eq!(caught.message(), "nope");
}

#[test]
fn test_json_fixture_flow() {
    let mut arena = pathtrace::parse(&read_fixture("call_chain.json")).unwrap();
    let config = TransformConfig {
        delimiter: "::".to_string(),
        ..Default::default()
    };
    pathtrace::instrument(&mut arena, &config).unwrap();

    let output = pathtrace::emit(&arena, false).unwrap();
    let reparsed = pathtrace::parse(&output).unwrap();
    assert_eq!(path_of(&uncaught(&reparsed).to_caught()), "outer::inner");
}

#[test]
fn test_agrees_with_runtime_model() {
    let mut arena = Arena::new();
    call_chain(&mut arena);
    instrument(&mut arena, TransformConfig::default());
    let evaluated = uncaught(&arena).to_caught();

    let inner = rethrow(Caught::plain("boom"), "inner", " -> ", ChainOrder::OuterFirst);
    let outer = rethrow(inner.into(), "outer", " -> ", ChainOrder::OuterFirst);
    assert_eq!(evaluated, Caught::PathAnnotated(outer));
}
