use keyva_lang::run_program;

const SRC: &str = include_str!("../demos/functions.kv");

#[test]
fn recursive_and_builtin_functions() {
    let mut out = Vec::new();
    run_program(SRC, &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "49\n55\n1\n");
}

#[test]
fn extra_arguments_beyond_the_parameter_list_are_ignored() {
    let mut out = Vec::new();
    run_program("def f(a)\nreturn a\nend\nprint(f(1, 2, 3))\n", &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "1\n");
}

#[test]
fn missing_arguments_bind_to_the_string_zero() {
    let mut out = Vec::new();
    run_program("def f(a, b)\nreturn a\nend\nprint(f())\n", &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "0\n");
}
