use keyva_lang::run_program;

const SRC: &str = include_str!("../demos/boolean.kv");

#[test]
fn comparisons_and_string_truthiness() {
    let mut out = Vec::new();
    run_program(SRC, &mut out);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "equal\nnot equal\nempty string is falsy\n"
    );
}

#[test]
fn comparison_operators_yield_one_or_zero() {
    let mut out = Vec::new();
    run_program("print(2 > 1)\nprint(1 > 2)\n", &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "1\n0\n");
}
