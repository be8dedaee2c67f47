use keyva_lang::run_program;

fn run(src: &str) -> String {
    let mut out = Vec::new();
    run_program(src, &mut out);
    String::from_utf8(out).unwrap()
}

#[test]
fn a_function_is_callable_from_a_later_statement_in_the_same_submission() {
    let src = "def double(n)\nreturn n + n\nend\nprint(double(21))\n";
    assert_eq!(run(src), "42\n");
}

#[test]
fn a_parse_error_does_not_undo_earlier_side_effects() {
    let src = "print(1)\nprint(2)\n*\nprint(3)\n";
    // `*` cannot start a statement: the parser stops there, but the two
    // `print`s that already ran before it keep their output.
    assert_eq!(run(src), "1\n2\n");
}

#[test]
fn redefining_a_function_overwrites_the_earlier_definition() {
    let src = "def f()\nreturn 1\nend\ndef f()\nreturn 2\nend\nprint(f())\n";
    assert_eq!(run(src), "2\n");
}

#[test]
fn return_inside_nested_if_inside_a_function_unwinds_to_the_function_boundary() {
    // The grammar has no unary minus; a negative number can only arrive as
    // a quoted literal whose text happens to start with `-`.
    let src = "def classify(n)\nif n < 0\nreturn \"negative\"\nend\nreturn \"non-negative\"\nend\nprint(classify(\"-3\"))\nprint(classify(3))\n";
    assert_eq!(run(src), "negative\nnon-negative\n");
}
