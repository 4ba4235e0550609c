//! End-to-end scenarios through the public API: source in, final value or
//! typed error out.

use bytelox::value::Value;
use bytelox::vm::{InterpretError, VM};

fn eval(source: &str) -> Result<Value, InterpretError> {
    VM::default().interpret(source)
}

fn eval_ok(source: &str) -> Value {
    eval(source).unwrap_or_else(|e| panic!("{source:?} failed with {e}"))
}

// renders the result while the vm (and thus any string object) is alive
fn eval_display(source: &str) -> String {
    let mut vm = VM::default();
    let value = vm
        .interpret(source)
        .unwrap_or_else(|e| panic!("{source:?} failed with {e}"));
    value.to_string()
}

#[test]
fn literals() {
    assert_eq!(eval_ok("7"), Value::from(7.0));
    assert_eq!(eval_ok("2.5"), Value::from(2.5));
    assert_eq!(eval_ok("true"), Value::from(true));
    assert_eq!(eval_ok("false"), Value::from(false));
    assert_eq!(eval_ok("nil"), Value::Nil);
    assert_eq!(eval_display("\"hello\""), "hello");
}

#[test]
fn arithmetic() {
    assert_eq!(eval_ok("1 + 2 * 3"), Value::from(7.0));
    assert_eq!(eval_ok("(1 + 2) * 3"), Value::from(9.0));
    assert_eq!(eval_ok("10 - 4 - 3"), Value::from(3.0));
    assert_eq!(eval_ok("1 + 2 * 3 - 8 / -4"), Value::from(9.0));
}

#[test]
fn booleans_and_negation() {
    assert_eq!(eval_ok("!nil"), Value::from(true));
    assert_eq!(eval_ok("!true"), Value::from(false));
    assert_eq!(eval_ok("!(5 - 4 > 3 * 2 == !nil)"), Value::from(true));
}

#[test]
fn comparisons_and_equality() {
    assert_eq!(eval_ok("1 <= 2"), Value::from(true));
    assert_eq!(eval_ok("2 >= 2"), Value::from(true));
    assert_eq!(eval_ok("1 == 1.0"), Value::from(true));
    assert_eq!(eval_ok("\"x\" == \"y\""), Value::from(false));
    assert_eq!(eval_ok("\"x\" == 1"), Value::from(false));
}

#[test]
fn string_concatenation() {
    assert_eq!(eval_ok("\"he\" + \"llo\" == \"hello\""), Value::from(true));
    assert_eq!(eval_ok("\"\" + \"\" == \"\""), Value::from(true));
    assert_eq!(eval_display("\"one\" + \" \" + \"two\""), "one two");
}

#[test]
fn multiline_input() {
    assert_eq!(eval_ok("1 +\n2"), Value::from(3.0));
    assert_eq!(eval_ok("// leading comment\n41 + 1"), Value::from(42.0));
}

#[test]
fn runtime_errors() {
    assert_eq!(eval("-true"), Err(InterpretError::Runtime));
    assert_eq!(eval("1 + \"a\""), Err(InterpretError::Runtime));
    assert_eq!(eval("\"a\" < \"b\""), Err(InterpretError::Runtime));
    assert_eq!(eval("nil + nil"), Err(InterpretError::Runtime));
}

#[test]
fn compile_errors() {
    assert_eq!(eval("1 +"), Err(InterpretError::Compile));
    assert_eq!(eval(""), Err(InterpretError::Compile));
    assert_eq!(eval("(1"), Err(InterpretError::Compile));
    assert_eq!(eval("1 2"), Err(InterpretError::Compile));
    assert_eq!(eval("\"unterminated"), Err(InterpretError::Compile));
    assert_eq!(eval("1 + #"), Err(InterpretError::Compile));
}

#[test]
fn one_vm_many_programs() {
    let mut vm = VM::default();
    assert_eq!(vm.interpret("1 + 1"), Ok(Value::from(2.0)));
    assert_eq!(vm.interpret("-false"), Err(InterpretError::Runtime));
    let value = vm.interpret("\"still\" + \" fine\"").unwrap();
    assert_eq!(value.as_str(), Some("still fine"));
}
