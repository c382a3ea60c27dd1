mod common;

use common::{error_messages, run, run_ok, session};
use loxwalk::Outcome;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn arithmetic_and_concatenation() {
    assert_eq!(
        run_ok(r#"print 1 + 2; print "1" + "2"; print 7 / 2; print -(3 - 5) * 2;"#),
        vec!["3", "12", "3.5", "4"]
    );
}

#[test]
fn adding_number_and_string_is_a_runtime_error() {
    let (outcome, _) = run(r#"print 1 + "2";"#);

    assert!(matches!(outcome, Outcome::RuntimeError(_)));
    assert_eq!(outcome.exit_code(), 70);
    assert_eq!(
        error_messages(&outcome),
        vec!["Operands must be two numbers or two strings.\n[line 1]"]
    );
}

#[test]
fn numeric_operators_reject_other_types() {
    let (outcome, _) = run(r#"print "a" < 1;"#);
    assert_eq!(
        error_messages(&outcome),
        vec!["Operand must be a numbers.\n[line 1]"]
    );

    let (outcome, _) = run(r#"print 1 - "a";"#);
    assert_eq!(
        error_messages(&outcome),
        vec!["Operand must be a numbers.\n[line 1]"]
    );

    let (outcome, _) = run(r#"print -"a";"#);
    assert_eq!(
        error_messages(&outcome),
        vec!["Operand must be a number.\n[line 1]"]
    );
}

#[test]
fn truthiness_only_nil_and_false_are_falsy() {
    assert_eq!(
        run_ok(r#"print !nil; print !false; print !0; print !""; if (0) print "yes";"#),
        vec!["true", "true", "false", "false", "yes"]
    );
}

#[test]
fn equality_has_no_coercion() {
    assert_eq!(
        run_ok(r#"print nil == nil; print nil == false; print 1 == 1; print "1" == 1; print "a" != "b";"#),
        vec!["true", "false", "true", "false", "true"]
    );
}

#[test]
fn logical_operators_return_operand_values() {
    assert_eq!(
        run_ok(r#"print nil or "x"; print 1 or 2; print nil and 1; print 1 and 2;"#),
        vec!["x", "1", "nil", "2"]
    );
}

#[test]
fn logical_operators_short_circuit() {
    let source = "\
var calls = 0;
fun bump() { calls = calls + 1; return true; }
true or bump();
false and bump();
print calls;
";
    assert_eq!(run_ok(source), vec!["0"]);
}

#[test]
fn shadowing_prints_inner_then_outer() {
    assert_eq!(
        run_ok(r#"var a = "outer"; { var a = "inner"; print a; } print a;"#),
        vec!["inner", "outer"]
    );
}

#[test]
fn assignment_is_an_expression_and_updates_the_declaring_scope() {
    let source = "\
var a = 1;
{
  var b = a = 2;
  print b;
}
print a;
";
    assert_eq!(run_ok(source), vec!["2", "2"]);
}

#[test]
fn closures_capture_by_reference() {
    let source = "\
fun makeCounter() {
  var i = 0;
  fun inc() { i = i + 1; return i; }
  return inc;
}
var c = makeCounter();
print c();
print c();
var d = makeCounter();
print d();
";
    assert_eq!(run_ok(source), vec!["1", "2", "1"]);
}

#[test]
fn closure_binding_is_static_even_when_a_later_local_shadows_it() {
    // The chain search would find the inner "block" binding on the second
    // call; the resolved distance keeps pointing at the global.
    let source = r#"
var a = "global";
{
  fun showA() { print a; }
  showA();
  var a = "block";
  showA();
}
"#;
    assert_eq!(run_ok(source), vec!["global", "global"]);
}

#[test]
fn recursion_returns_correct_values() {
    let source = "\
fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
print fib(10);
";
    assert_eq!(run_ok(source), vec!["55"]);
}

#[test]
fn return_without_value_yields_nil_and_stops_the_body() {
    let source = "\
fun f() { print 1; return; print 2; }
print f();
fun g() {}
print g();
";
    assert_eq!(run_ok(source), vec!["1", "nil", "nil"]);
}

#[test]
fn return_unwinds_out_of_nested_loops_and_restores_scope() {
    let source = "\
var x = \"global\";
fun find() {
  var x = \"local\";
  while (true) {
    for (var i = 0; i < 10; i = i + 1) {
      if (i == 3) return i;
    }
  }
}
print find();
print x;
";
    assert_eq!(run_ok(source), vec!["3", "global"]);
}

#[test]
fn for_and_while_loops() {
    let source = "\
for (var i = 0; i < 3; i = i + 1) print i;
var n = 3;
while (n > 0) { print n; n = n - 1; }
";
    assert_eq!(run_ok(source), vec!["0", "1", "2", "3", "2", "1"]);
}

#[test]
fn for_loop_closures_share_the_loop_variable() {
    let source = "\
var f;
for (var i = 0; i < 3; i = i + 1) {
  fun get() { return i; }
  if (i == 0) f = get;
}
print f();
";
    assert_eq!(run_ok(source), vec!["3"]);
}

#[test]
fn arity_mismatch_names_expected_and_actual() {
    let (outcome, _) = run("fun f(a) {} f();");
    assert_eq!(
        error_messages(&outcome),
        vec!["Expected 1 arguments but got 0.\n[line 1]"]
    );

    let (outcome, _) = run("fun f(a) {} f(1, 2);");
    assert_eq!(
        error_messages(&outcome),
        vec!["Expected 1 arguments but got 2.\n[line 1]"]
    );
}

#[test]
fn calling_a_non_callable_is_an_error() {
    let (outcome, _) = run(r#""not a function"();"#);

    assert_eq!(
        error_messages(&outcome),
        vec!["Can only call functions and classes.\n[line 1]"]
    );
}

#[test]
fn undefined_variable_read_and_write() {
    let (outcome, _) = run("print missing;");
    assert_eq!(
        error_messages(&outcome),
        vec!["Undefined variable 'missing'.\n[line 1]"]
    );

    let (outcome, _) = run("missing = 1;");
    assert_eq!(
        error_messages(&outcome),
        vec!["Undefined variable 'missing'.\n[line 1]"]
    );
}

#[test]
fn runtime_error_aborts_the_rest_of_the_program() {
    let (outcome, out) = run("print 1; print -nil; print 2;");

    assert!(matches!(outcome, Outcome::RuntimeError(_)));
    assert_eq!(out, "1\n");
}

#[test]
fn arguments_are_evaluated_left_to_right_before_the_call() {
    let source = "\
fun show(a, b) { print a + b; }
fun tag(x) { print x; return x; }
show(tag(\"a\"), tag(\"b\"));
";
    assert_eq!(run_ok(source), vec!["a", "b", "ab"]);
}

#[test]
fn function_values_display() {
    assert_eq!(
        run_ok("fun f() {} print f; print clock;"),
        vec!["<fn f>", "<native fn>"]
    );
}

#[test]
fn functions_compare_by_identity() {
    let source = "\
fun f() {}
var g = f;
fun make() { fun h() {} return h; }
print f == g;
print make() == make();
";
    assert_eq!(run_ok(source), vec!["true", "false"]);
}

#[test]
fn clock_returns_seconds() {
    let lines = run_ok("print clock() > 1000000000;");
    assert_eq!(lines, vec!["true"]);
}

#[test]
fn clock_takes_no_arguments() {
    let (outcome, _) = run("clock(1);");
    assert_eq!(
        error_messages(&outcome),
        vec!["Expected 0 arguments but got 1.\n[line 1]"]
    );
}

#[test]
fn static_errors_prevent_execution() {
    let (outcome, out) = run("print 1; print ;");

    assert!(matches!(outcome, Outcome::StaticErrors(_)));
    assert_eq!(outcome.exit_code(), 65);
    assert_eq!(out, "");

    let (outcome, out) = run("print 1; { var a = a; }");
    assert_eq!(outcome.exit_code(), 65);
    assert_eq!(out, "");
}

#[test]
fn scan_and_parse_errors_are_reported_together() {
    let (outcome, _) = run("var a = @;\nprint;");

    assert_eq!(
        error_messages(&outcome),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
            "[line 2] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn session_keeps_globals_across_runs() {
    let (mut lox, buf) = session();

    assert!(lox.run("var count = 1;").is_success());
    assert!(lox.run("fun inc() { count = count + 1; return count; }").is_success());
    assert!(matches!(lox.run("print ;"), Outcome::StaticErrors(_)));
    assert!(lox.run("print inc();").is_success());
    assert!(lox.run("print inc();").is_success());

    assert_eq!(buf.contents(), "2\n3\n");
}

#[test]
fn session_runs_files() {
    let path = std::env::temp_dir().join(format!("loxwalk-test-{}.lox", std::process::id()));
    std::fs::write(&path, "print \"from file\";").unwrap();

    let (mut lox, buf) = session();
    let outcome = lox.run_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(outcome.is_success());
    assert_eq!(buf.contents(), "from file\n");
}

#[test]
fn missing_file_is_an_io_error() {
    let (mut lox, _) = session();
    let err = lox
        .run_file("/definitely/not/here.lox")
        .expect_err("missing file");

    assert!(matches!(err, loxwalk::LoxError::Io(_)));
}

#[test]
fn large_numbers_and_infinities_display() {
    assert_eq!(
        run_ok("print 1000000000000000000000; print 1 / 0; print -1 / 0; print 123456789;"),
        vec!["1e+21", "+Inf", "-Inf", "123456789"]
    );
}

/// Output sink that refuses every write.
struct BrokenPipe;

impl std::io::Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_print_is_an_io_error_not_a_runtime_error() {
    let mut lox = loxwalk::Lox::with_output(Box::new(BrokenPipe));
    let outcome = lox.run("print 1;");

    assert!(matches!(outcome, Outcome::RuntimeError(loxwalk::LoxError::Io(_))));
    assert_eq!(outcome.exit_code(), 74);
}

proptest! {
    #[test]
    fn arithmetic_matches_ieee754(x in 0u32..1_000_000, y in 0u32..1_000_000) {
        let (a, b) = (f64::from(x) / 100.0, f64::from(y) / 100.0);
        let source = format!(
            "var a = {a:?}; var b = {b:?}; print a + b == {sum:?}; print a * b == {prod:?}; print a - b == {diff:?};",
            sum = a + b,
            prod = a * b,
            diff = a - b,
        );

        // A negative `diff` scans as unary minus applied to its magnitude.
        let lines = run_ok(&source);
        prop_assert_eq!(lines, vec!["true", "true", "true"]);
    }
}
