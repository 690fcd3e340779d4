//! End-to-end compilation through the public driver.

#![allow(clippy::unwrap_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use ts2c::codegen::{
    Bottom, CallResolver, Code, Header, LowerCx, Lowered, Main, Plugin, Preset,
};
use ts2c::codegen::runtime::StaticHeader;
use ts2c::diagnostic::ErrorCode;
use ts2c::{compile, CompileError, CompileOptions};
use ts2c_ir::{Ast, CallSite, NodeId, StringInterner};
use ts2c_types::{InferenceError, NativeType, TypeQuery};

fn compile_ok(source: &str) -> String {
    let output = compile(source, &CompileOptions::default()).unwrap();
    assert!(output.success, "{:?}", output.diagnostics);
    output.code
}

#[track_caller]
fn assert_lines_in_order(code: &str, expected: &[&str]) {
    let mut rest = code;
    for line in expected {
        match rest.find(line) {
            Some(at) => rest = &rest[at + line.len()..],
            None => panic!("`{line}` missing (or out of order) in:\n{code}"),
        }
    }
}

#[test]
fn test_integer_expression() {
    assert_eq!(
        compile_ok("const result = 3 + 4;"),
        "#include <stdint.h>\n\nint16_t result;\n\nint main(void) {\n    result = 3 + 4;\n    return 0;\n}\n"
    );
}

#[test]
fn test_push_returns_new_size() {
    let code = compile_ok("let a = [];\na.push(10);\nconst result = a.push(2);");
    assert_lines_in_order(&code, &["ARRAY_PUSH(a, 10);", "ARRAY_PUSH(a, 2);", "result = a->size;"]);
}

#[test]
fn test_float_arithmetic() {
    let code = compile_ok("const a = 45.97, b = 4.32;\nconst result = a + b;\nconsole.log(result);");
    assert_lines_in_order(&code, &["float result;", "result = a + b;", "printf(\"%f\\n\", result);"]);
}

#[test]
fn test_string_number_comparison() {
    let code = compile_ok("let s = \"10\";\nconst result = s == 2 * 5;");
    assert!(code.contains("result = str_int16_t_cmp(s, 2 * 5) == 0;"), "{code}");
}

#[test]
fn test_object_literal() {
    let code = compile_ok("const result = { hello: \"World\" };\nconsole.log(result);");
    assert_lines_in_order(
        &code,
        &[
            "struct result_t {",
            "result->hello = \"World\";",
            r#"printf("{ \"hello\": \"%s\" }\n", result->hello);"#,
        ],
    );
}

#[test]
fn test_shift_then_length() {
    let code = compile_ok("let a = [1, 2, 3];\na.shift();\nconst result = a.length;");
    assert_lines_in_order(&code, &["ARRAY_REMOVE(a, 0, 1);", "result = a->size;"]);
}

#[test]
fn test_locally_owned_string_is_freed() {
    let code = compile_ok(
        "function greet(n) {\n    let s = \"n=\" + n;\n    console.log(s);\n}\ngreet(3);",
    );
    assert_lines_in_order(
        &code,
        &[
            "void greet(int16_t n) {",
            "malloc(",
            "s = tmp_string;",
            "printf(",
            "free((void *)tmp_string);",
            "}",
        ],
    );
}

#[test]
fn test_incompatible_types_fail_without_boxed_stores() {
    let output = compile("let x = 1;\nx = \"s\";\nx++;", &CompileOptions::default()).unwrap();
    assert!(!output.success);
    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2002]);
    assert!(!output.code.contains("x = 1;"), "{}", output.code);
    assert!(!output.code.contains("x = \"s\";"), "{}", output.code);
    assert!(!output.code.contains("x++"), "{}", output.code);
}

#[test]
fn test_dict_key_built_in_a_loop_is_not_freed_there() {
    let code = compile_ok("let m = {};\nfor (let i = 0; i < 3; i++) {\n    m[\"k\" + i] = i;\n}");
    let body = &code[code.find("for (").unwrap()..];
    let body = &body[..body.find("\n    }").unwrap()];
    assert!(body.contains("DICT_SET(m, tmp_string, i);"), "{code}");
    assert!(!body.contains("free((void *)tmp_string);"), "{code}");
}

#[test]
fn test_parse_errors_stop_early() {
    let output = compile("let = ;", &CompileOptions::default()).unwrap();
    assert!(!output.success);
    assert!(output.code.is_empty());
    assert!(!output.diagnostics.is_empty());
}

#[test]
fn test_divergent_inference_aborts() {
    let options = CompileOptions {
        max_fixpoint_iterations: Some(5),
        ..CompileOptions::default()
    };
    let err = compile("let a = [];\na.push(a);", &options).unwrap_err();
    assert_eq!(
        err,
        CompileError::Inference(InferenceError::FixpointDiverged { iterations: 5 })
    );
    assert_eq!(err.to_diagnostic().code, ErrorCode::E9002);
}

/// `millis()` and `digitalWrite(pin, value)` on a board with an `LED`.
struct BoardApi;

impl CallResolver for BoardApi {
    fn matches(&self, _ast: &Ast, _types: &dyn TypeQuery, site: &CallSite) -> bool {
        site.is_function("millis") || site.is_function("digitalWrite")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, site: &CallSite) -> NativeType {
        if site.is_function("millis") {
            NativeType::native("uint32_t")
        } else {
            NativeType::VOID
        }
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        cx.require("board");
        let mut hoisted = Vec::new();
        let args: Vec<String> = site.args.iter().map(|&arg| cx.text(arg, &mut hoisted)).collect();
        let name = site.function.unwrap_or("millis");
        Code::with_hoisted(format!("{name}({})", args.join(", ")), hoisted).boxed()
    }
}

impl Plugin for BoardApi {
    fn declare_types(&self, ast: &Ast, interner: &StringInterner, node: NodeId) -> Option<NativeType> {
        let site = CallSite::from_node(ast, interner, node)?;
        site.is_function("millis").then(|| NativeType::native("uint32_t"))
    }

    fn globals(&self) -> &[&str] {
        &["LED"]
    }
}

struct BoardInit;

impl Main for BoardInit {
    fn render(&self) -> String {
        "board_init();".to_string()
    }
}

struct Watchdog;

impl Bottom for Watchdog {
    fn name(&self) -> &str {
        "on_idle"
    }

    fn render(&self) -> String {
        "watchdog_kick();".to_string()
    }
}

struct Board;

impl Preset for Board {
    fn headers(&self) -> Vec<Rc<dyn Header>> {
        vec![Rc::new(StaticHeader::new("board", "#include <board.h>", &[]))]
    }

    fn plugins(&self) -> Vec<Rc<dyn Plugin>> {
        vec![Rc::new(BoardApi)]
    }

    fn mains(&self) -> Vec<Rc<dyn Main>> {
        vec![Rc::new(BoardInit)]
    }

    fn bottoms(&self) -> Vec<Rc<dyn Bottom>> {
        vec![Rc::new(Watchdog)]
    }
}

#[test]
fn test_board_preset() {
    let options = CompileOptions {
        presets: vec![Rc::new(Board)],
        ..CompileOptions::default()
    };
    let output = compile("let t = millis();\ndigitalWrite(LED, 1);", &options).unwrap();
    assert!(output.success, "{:?}", output.diagnostics);
    assert_lines_in_order(
        &output.code,
        &[
            "#include <board.h>",
            "uint32_t t;",
            "void on_idle(void) {",
            "    watchdog_kick();",
            "}",
            "int main(void) {",
            "    board_init();",
            "    t = millis();",
            "    digitalWrite(LED, 1);",
            "    return 0;",
        ],
    );
}

#[test]
fn test_without_preset_board_calls_are_plain() {
    let output = compile("digitalWrite(13, 1);", &CompileOptions::default()).unwrap();
    assert!(output.code.contains("    digitalWrite(13, 1);"), "{}", output.code);
    assert!(!output.code.contains("board.h"));
}
