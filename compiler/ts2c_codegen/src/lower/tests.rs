#![allow(clippy::unwrap_used)]

use ts2c_diagnostic::ErrorCode;

use crate::test_helpers::{assert_lines_in_order, c_code, lowering_diagnostics};

#[test]
fn test_string_concatenation_builds_a_buffer() {
    let code = c_code("let a = \"x\";\nlet b = a + 1;\nconsole.log(b);");
    assert!(code.contains("= malloc(strlen(a) + STR_INT16_T_BUFLEN + 1);"), "{code}");
    assert_lines_in_order(&code, &["[0] = '\\0';", "strcat(", ", a);", "str_int16_t_cat(", ", 1);"]);
    assert!(code.contains("#include <string.h>"), "{code}");
}

#[test]
fn test_string_comparisons() {
    let code = c_code(
        "let s = \"b\";\nlet same = s == \"a\";\nlet less = s < \"c\";\nlet ten = 10 == s;\nlet big = s > 3;",
    );
    assert_lines_in_order(
        &code,
        &[
            "same = strcmp(s, \"a\") == 0;",
            "less = strcmp(s, \"c\") < 0;",
            "ten = str_int16_t_cmp(s, 10) == 0;",
            "big = atoi(s) > 3;",
        ],
    );
}

#[test]
fn test_float_modulo_and_division() {
    let code = c_code("let f = 5.5;\nlet m = f % 2;\nlet n = 7;\nlet q = n / 2;");
    assert!(code.contains("#include <math.h>"), "{code}");
    assert!(code.contains("m = fmod(f, 2);"), "{code}");
    assert!(code.contains("q = (float)n / 2;"), "{code}");
}

#[test]
fn test_typeof_is_static() {
    let code = c_code("let n = 1;\nlet t = typeof n;\nlet u = typeof \"s\";");
    assert!(code.contains("t = \"number\";"), "{code}");
    assert!(code.contains("u = \"string\";"), "{code}");
}

#[test]
fn test_else_if_chain() {
    let code = c_code(
        "let n = 3;\nlet r = 0;\nif (n > 5) {\n    r = 1;\n} else if (n > 2) {\n    r = 2;\n} else {\n    r = 3;\n}",
    );
    assert_lines_in_order(
        &code,
        &[
            "    if (n > 5) {",
            "        r = 1;",
            "    } else if (n > 2) {",
            "        r = 2;",
            "    } else {",
            "        r = 3;",
            "    }",
        ],
    );
}

#[test]
fn test_while_and_for_loops() {
    let code = c_code(
        "let i = 0;\nlet sum = 0;\nwhile (i < 10) {\n    i++;\n}\nfor (let j = 0; j < 3; j++) {\n    sum += j;\n}",
    );
    assert_lines_in_order(
        &code,
        &[
            "    while (i < 10) {",
            "        i++;",
            "    }",
            "    for (j = 0; j < 3; j++) {",
            "        sum += j;",
            "    }",
        ],
    );
}

#[test]
fn test_do_while_keeps_condition_at_the_end() {
    let code = c_code("let i = 0;\ndo {\n    i += 2;\n} while (i < 5);");
    assert_lines_in_order(&code, &["    do {", "        i += 2;", "    } while (i < 5);"]);
}

#[test]
fn test_continue_runs_an_update_moved_into_the_body() {
    let code = c_code(
        "let n = 0;\nfor (let s = \"\"; s.length < 4; s += \"a\") {\n    n++;\n    if (s.length == 1) continue;\n}\nconsole.log(n);",
    );
    assert_lines_in_order(
        &code,
        &["for (s = \"\";", "n++;", "s = tmp_string;", "continue;", "s = tmp_string;", "}"],
    );
    assert_eq!(code.matches("s = tmp_string;").count(), 2, "{code}");
}

#[test]
fn test_continue_checks_a_do_while_condition_with_statements() {
    let code = c_code(
        "let i = 0;\ndo {\n    i++;\n    if (i == 1) continue;\n} while (\"x\" + i != \"x3\");",
    );
    assert_lines_in_order(&code, &["while (1) {", "i++;", "if (!(", "continue;", "if (!("]);
    assert!(!code.contains("} while ("), "{code}");
}

#[test]
fn test_for_of_over_static_array() {
    let code = c_code("let a = [1, 2, 3];\nlet sum = 0;\nfor (const x of a) {\n    sum += x;\n}");
    assert_lines_in_order(
        &code,
        &[
            "int16_t a[3];",
            "a[0] = 1;",
            "for (x_i = 0; x_i < 3; x_i++) {",
            "        x = a[x_i];",
            "        sum += x;",
            "    }",
        ],
    );
}

#[test]
fn test_for_of_over_dynamic_array() {
    let code = c_code("let a = [];\na.push(4);\nlet sum = 0;\nfor (const x of a) {\n    sum += x;\n}");
    assert_lines_in_order(
        &code,
        &[
            "for (x_i = 0; x_i < a->size; x_i++) {",
            "        x = a->data[x_i];",
            "        sum += x;",
        ],
    );
}

#[test]
fn test_missing_arguments_are_zero_filled() {
    let code = c_code("function f(a, b) {\n    return a + b;\n}\nlet r = f(1);\nlet s = f(1, 2, 3);");
    assert!(code.contains("r = f(1, 0);"), "{code}");
    assert!(code.contains("s = f(1, 2);"), "{code}");
}

#[test]
fn test_unsupported_construct_is_reported() {
    let diagnostics = lowering_diagnostics("let n = 5;\nfor (const k in n) {\n}");
    assert!(
        diagnostics
            .iter()
            .any(|diagnostic| diagnostic.code == ErrorCode::E2004),
        "{diagnostics:?}"
    );
}
