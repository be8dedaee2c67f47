use keyva_lang::run_program;

const SRC: &str = include_str!("../demos/hello.kv");

#[test]
fn prints_hello_world() {
    let mut out = Vec::new();
    run_program(SRC, &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "Hello, World!\n");
}
