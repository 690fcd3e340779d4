#![allow(clippy::unwrap_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use ts2c_diagnostic::ErrorCode;
use ts2c_ir::CallSite;
use ts2c_types::TypeQuery;

use super::*;
use crate::lower::{Code, Lowered};
use crate::registry::{Bottom, Header, HeaderCx, Main, Preset};
use crate::resolve::{CallResolver, Plugin};
use crate::runtime::StaticHeader;
use crate::test_helpers::{assert_lines_in_order, c_code, try_generate};

#[test]
fn test_integer_expression_program() {
    assert_eq!(
        c_code("const result = 3 + 4;"),
        "#include <stdint.h>\n\
         \n\
         int16_t result;\n\
         \n\
         int main(void) {\n    result = 3 + 4;\n    return 0;\n}\n"
    );
}

#[test]
fn test_push_evaluates_to_new_size() {
    let code = c_code("let a = [];\na.push(10);\nconst result = a.push(2);");
    assert_lines_in_order(
        &code,
        &[
            "struct array_int16_t {",
            "struct array_int16_t * a;",
            "int16_t result;",
            "int main(void) {",
            "ARRAY_CREATE(a, 2, 0);",
            "ARRAY_PUSH(a, 10);",
            "ARRAY_PUSH(a, 2);",
            "result = a->size;",
            "return 0;",
        ],
    );
}

#[test]
fn test_float_sum_prints_with_percent_f() {
    let code = c_code("const a = 45.97, b = 4.32;\nconst result = a + b;\nconsole.log(result);");
    assert_lines_in_order(
        &code,
        &[
            "#include <stdio.h>",
            "float a;",
            "float b;",
            "float result;",
            "a = 45.97;",
            "b = 4.32;",
            "result = a + b;",
            "printf(\"%f\\n\", result);",
        ],
    );
}

#[test]
fn test_string_number_equality() {
    let code = c_code("let s = \"10\";\nconst result = s == 2 * 5;");
    assert!(code.contains("int str_int16_t_cmp(const char * str, int32_t num) {"), "{code}");
    assert!(code.contains("result = str_int16_t_cmp(s, 2 * 5) == 0;"), "{code}");
}

#[test]
fn test_object_literal_becomes_struct() {
    let code = c_code("const result = { hello: \"World\" };\nconsole.log(result);");
    assert_lines_in_order(
        &code,
        &[
            "struct result_t {",
            "    const char * hello;",
            "};",
            "struct result_t * result;",
            "result = malloc(sizeof(*result));",
            "assert(result != NULL);",
            "result->hello = \"World\";",
            r#"printf("{ \"hello\": \"%s\" }\n", result->hello);"#,
        ],
    );
}

#[test]
fn test_shift_removes_in_place() {
    let code = c_code("let a = [1, 2, 3];\na.shift();\nconst result = a.length;");
    assert_lines_in_order(
        &code,
        &[
            "ARRAY_CREATE(a, 3, 3);",
            "a->data[0] = 1;",
            "a->data[1] = 2;",
            "a->data[2] = 3;",
            "ARRAY_REMOVE(a, 0, 1);",
            "result = a->size;",
        ],
    );
}

#[test]
fn test_headers_are_emitted_before_their_users() {
    let code = c_code("let a = [];\na.push(\"x\");");
    let array_macros = code.find("#define ARRAY_CREATE").unwrap();
    let stdlib = code.find("#include <stdlib.h>").unwrap();
    assert!(stdlib < array_macros);
    assert_eq!(code.matches("#include <stdlib.h>").count(), 1);
}

#[test]
fn test_functions_get_prototypes() {
    let code = c_code("function add(x, y) {\n    return x + y;\n}\nconst r = add(1, 2);");
    assert_lines_in_order(
        &code,
        &[
            "int16_t add(int16_t x, int16_t y);",
            "int16_t add(int16_t x, int16_t y) {",
            "    return x + y;",
            "}",
            "int main(void) {",
            "    r = add(1, 2);",
        ],
    );
}

struct Board;

impl Main for Board {
    fn render(&self) -> String {
        "board_init();".to_string()
    }
}

struct Tick(&'static str);

impl Bottom for Tick {
    fn name(&self) -> &str {
        "on_tick"
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

struct BoardPreset;

impl Preset for BoardPreset {
    fn headers(&self) -> Vec<Rc<dyn Header>> {
        vec![Rc::new(StaticHeader::new("board", "#include <board.h>", &[]))]
    }

    fn mains(&self) -> Vec<Rc<dyn Main>> {
        vec![Rc::new(Board)]
    }

    fn bottoms(&self) -> Vec<Rc<dyn Bottom>> {
        vec![Rc::new(Tick("led_toggle();")), Rc::new(Tick("counter++;"))]
    }
}

#[test]
fn test_mains_and_bottoms_from_presets() {
    let presets: Vec<Rc<dyn Preset>> = vec![Rc::new(BoardPreset)];
    let context = CompilationContext::with_presets(&presets);
    let output = try_generate("let x = 1;", &context).unwrap();
    assert_lines_in_order(
        &output.code,
        &[
            "void on_tick(void) {\n    led_toggle();\n    counter++;\n}",
            "int main(void) {",
            "    board_init();",
            "    x = 1;",
        ],
    );
}

struct NeedsBoard;

impl Header for NeedsBoard {
    fn type_key(&self) -> &str {
        "needs_board"
    }

    fn render(&self, cx: &mut HeaderCx) -> String {
        cx.require("board_io");
        String::new()
    }
}

/// `led.on()`, lowered through a header nothing implements fully.
struct Led;

impl CallResolver for Led {
    fn matches(&self, _ast: &Ast, _types: &dyn TypeQuery, site: &CallSite) -> bool {
        site.is_qualified("led", "on")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::VOID
    }

    fn lower(&self, cx: &mut LowerCx<'_>, _site: &CallSite) -> Lowered {
        cx.require("needs_board");
        Code::new("led_on()").boxed()
    }
}

impl Plugin for Led {
    fn globals(&self) -> &[&str] {
        &["led"]
    }
}

#[test]
fn test_plugin_call_pulls_in_its_header() {
    let mut context = CompilationContext::new();
    context.register_plugin(Rc::new(Led));
    context.register_header(Rc::new(StaticHeader::new("needs_board", "#include <board.h>", &[])));
    let output = try_generate("led.on();", &context).unwrap();
    assert_lines_in_order(&output.code, &["#include <board.h>", "    led_on();"]);
}

#[test]
fn test_missing_header_aborts_generation() {
    let mut context = CompilationContext::new();
    context.register_plugin(Rc::new(Led));
    context.register_header(Rc::new(NeedsBoard));
    let error = try_generate("led.on();", &context).unwrap_err();
    assert_eq!(
        error,
        CodegenError::MissingHeader {
            key: "board_io".to_string(),
            required_by: Some("needs_board".to_string()),
        }
    );
    assert_eq!(error.to_diagnostic().code, ErrorCode::E9001);
}

#[test]
fn test_join_headers_groups_directives() {
    let headers = vec![
        "#include <stdio.h>".to_string(),
        "#include <stdint.h>".to_string(),
        "struct point {\n    int16_t x;\n};".to_string(),
        "#define TRUE 1".to_string(),
    ];
    assert_eq!(
        join_headers(&headers),
        "#include <stdio.h>\n#include <stdint.h>\n\nstruct point {\n    int16_t x;\n};\n\n#define TRUE 1"
    );
}
