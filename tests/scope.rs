use keyva_lang::run_program;

const SRC: &str = include_str!("../demos/scope.kv");

#[test]
fn function_frames_are_isolated_not_nested() {
    let mut out = Vec::new();
    run_program(SRC, &mut out);
    // The callee's frame starts empty, so `peek()` cannot see the caller's
    // `x` and its undefined-variable fallback (number 0) is what prints;
    // the caller's own `x` is untouched once the frame is popped.
    assert_eq!(String::from_utf8(out).unwrap(), "0\n5\n");
}

#[test]
fn if_while_and_for_blocks_do_not_push_a_frame() {
    let mut out = Vec::new();
    run_program("x = 1\nif 1\nx = 2\nend\nprint(x)\n", &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "2\n");
}
