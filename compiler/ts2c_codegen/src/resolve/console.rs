//! `console.log` as a sequence of typed `printf` calls.

use ts2c_ir::{Ast, CallSite, NodeKind};
use ts2c_types::{NativeType, Primitive, TypeQuery};

use super::CallResolver;
use crate::ctype::string_literal;
use crate::lower::{index_loop, Code, LowerCx, Lowered};
use crate::runtime::keys;

pub struct ConsoleLog;

impl CallResolver for ConsoleLog {
    fn matches(&self, _ast: &Ast, _types: &dyn TypeQuery, site: &CallSite) -> bool {
        site.is_qualified("console", "log")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::VOID
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        cx.require(keys::STDIO);
        let ast = cx.ast;
        let mut out = Vec::new();
        let mut printf = Printf::default();
        for (position, &arg) in site.args.iter().enumerate() {
            if position > 0 {
                printf.text(" ");
            }
            if let NodeKind::Str { value } = ast.kind(ast.unparen(arg)) {
                printf.text(cx.lookup(*value));
                continue;
            }
            let ty = cx.type_of(arg);
            let text = cx.text(arg, &mut out);
            print_value(cx, &mut printf, &mut out, &text, ty, false);
        }
        printf.text("\n");
        printf.flush(&mut out);
        Code::with_hoisted(String::new(), out).boxed()
    }
}

/// Pending `printf` format and arguments; adjacent pieces share one call.
#[derive(Default)]
struct Printf {
    format: String,
    args: Vec<String>,
}

impl Printf {
    fn text(&mut self, text: &str) {
        self.format.push_str(&text.replace('%', "%%"));
    }

    fn value(&mut self, spec: &str, arg: String) {
        self.format.push_str(spec);
        self.args.push(arg);
    }

    fn flush(&mut self, out: &mut Vec<String>) {
        if self.format.is_empty() {
            return;
        }
        let format = string_literal(&std::mem::take(&mut self.format));
        let args = std::mem::take(&mut self.args);
        if args.is_empty() {
            out.push(format!("printf({format});"));
        } else {
            out.push(format!("printf({format}, {});", args.join(", ")));
        }
    }
}

/// Print the value `text` of type `ty`. Strings nested in containers are
/// quoted.
fn print_value(
    cx: &mut LowerCx<'_>,
    printf: &mut Printf,
    out: &mut Vec<String>,
    text: &str,
    ty: &NativeType,
    nested: bool,
) {
    match ty {
        NativeType::Primitive(primitive) => match primitive {
            Primitive::Str if nested => printf.value("\"%s\"", text.to_string()),
            Primitive::Str => printf.value("%s", text.to_string()),
            Primitive::Int => printf.value("%d", text.to_string()),
            Primitive::Long => printf.value("%ld", format!("(long){text}")),
            Primitive::Float => printf.value("%f", text.to_string()),
            Primitive::Bool => printf.value("%s", format!("{text} ? \"true\" : \"false\"")),
            Primitive::Void => printf.text("undefined"),
            Primitive::Pointer | Primitive::Boxed | Primitive::Native(_) => {
                printf.text("[object]");
            }
        },
        NativeType::Array(array) => {
            let bound = if array.dynamic {
                format!("{text}->size")
            } else {
                array.capacity.to_string()
            };
            let element = if array.dynamic {
                format!("{text}->data")
            } else {
                text.to_string()
            };
            printf.text("[ ");
            printf.flush(out);
            let index = cx.fresh_local("i", &NativeType::INT);
            let mut body = vec![format!("if ({index} != 0)\n    printf(\", \");")];
            let mut inner = Printf::default();
            print_value(
                cx,
                &mut inner,
                &mut body,
                &format!("{element}[{index}]"),
                &array.element,
                true,
            );
            inner.flush(&mut body);
            out.push(index_loop(&index, &bound, &body));
            printf.text(" ]");
        }
        NativeType::Dict(element) => {
            printf.text("{ ");
            printf.flush(out);
            let index = cx.fresh_local("i", &NativeType::INT);
            let mut body = vec![format!("if ({index} != 0)\n    printf(\", \");")];
            let mut inner = Printf::default();
            inner.value("\"%s\": ", format!("{text}->index->data[{index}]"));
            print_value(
                cx,
                &mut inner,
                &mut body,
                &format!("{text}->values->data[{index}]"),
                element,
                true,
            );
            inner.flush(&mut body);
            out.push(index_loop(&index, &format!("{text}->index->size"), &body));
            printf.text(" }");
        }
        NativeType::Struct(shape) => {
            printf.text("{ ");
            for (position, (field, field_ty)) in shape.fields.iter().enumerate() {
                if position > 0 {
                    printf.text(", ");
                }
                printf.text(&format!("\"{field}\": "));
                print_value(cx, printf, out, &format!("{text}->{field}"), field_ty, true);
            }
            printf.text(" }");
        }
    }
}
