use keyva_lang::run_program;

const SRC: &str = include_str!("../demos/arrays.kv");

#[test]
fn array_prints_as_quoted_pairs_and_iterates_in_insertion_order() {
    let mut out = Vec::new();
    run_program(SRC, &mut out);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"lemon\": \"3\", \"lime\": \"5\"}\n3\n5\n"
    );
}

#[test]
fn numeric_index_is_identical_to_its_string_form() {
    let mut out = Vec::new();
    run_program("a[1] = \"x\"\nprint(a[\"1\"])\n", &mut out);
    assert_eq!(String::from_utf8(out).unwrap(), "x\n");
}
