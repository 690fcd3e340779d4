//! Array methods.

use ts2c_ir::{Ast, CallSite};
use ts2c_memory::EscapeTarget;
use ts2c_types::{NativeType, Primitive, TypeQuery, TypeTable};

use super::{receiver_type, CallResolver};
use crate::lower::{index_loop, Code, LowerCx, Lowered};
use crate::runtime::keys;

/// `recv.<name>(..)` on a dynamic array.
fn on_dynamic_array(types: &dyn TypeQuery, site: &CallSite, name: &str) -> bool {
    site.is_method(name)
        && receiver_type(types, site).is_some_and(|ty| ty.is_dynamic_array())
}

/// `recv.<name>(..)` on any array.
fn on_array(types: &dyn TypeQuery, site: &CallSite, name: &str) -> bool {
    site.is_method(name)
        && receiver_type(types, site).is_some_and(|ty| matches!(ty, NativeType::Array(_)))
}

fn element_type(types: &dyn TypeQuery, site: &CallSite) -> NativeType {
    receiver_type(types, site)
        .and_then(|ty| ty.element().cloned())
        .unwrap_or(NativeType::VOID)
}

/// Receiver text and type; the statements evaluating it go to `hoisted`.
fn receiver(cx: &mut LowerCx<'_>, site: &CallSite, hoisted: &mut Vec<String>) -> (String, NativeType) {
    let Some(node) = site.receiver else {
        return (String::new(), NativeType::VOID);
    };
    let ty = cx.type_of(node).clone();
    cx.require(keys::ARRAY);
    cx.require_type(&ty);
    (cx.text(node, hoisted), ty)
}

/// `arr.push(x, ..)`: evaluates to the new length.
pub struct ArrayPush;

impl CallResolver for ArrayPush {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_dynamic_array(types, site, "push")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn escape_target(&self, _: &Ast, _: &TypeTable, _: &CallSite, _: usize) -> EscapeTarget {
        EscapeTarget::Receiver
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() == 0 {
            return cx.wrong_arity(site, "at least 1");
        }
        let mut hoisted = Vec::new();
        let (array, _) = receiver(cx, site, &mut hoisted);
        for &arg in &site.args {
            let value = cx.text(arg, &mut hoisted);
            hoisted.push(format!("ARRAY_PUSH({array}, {value});"));
        }
        let text = if cx.is_discarded(site.node) {
            String::new()
        } else {
            format!("{array}->size")
        };
        Code::with_hoisted(text, hoisted).boxed()
    }
}

/// `arr.pop()`
pub struct ArrayPop;

impl CallResolver for ArrayPop {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_dynamic_array(types, site, "pop")
    }

    fn return_type(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> NativeType {
        element_type(types, site)
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() != 0 {
            return cx.wrong_arity(site, "0");
        }
        let mut hoisted = Vec::new();
        let (array, _) = receiver(cx, site, &mut hoisted);
        Code::with_hoisted(format!("ARRAY_POP({array})"), hoisted).boxed()
    }
}

/// `arr.shift()`: removes the first element in place.
pub struct ArrayShift;

impl CallResolver for ArrayShift {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_dynamic_array(types, site, "shift")
    }

    fn return_type(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> NativeType {
        element_type(types, site)
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() != 0 {
            return cx.wrong_arity(site, "0");
        }
        let mut hoisted = Vec::new();
        let (array, ty) = receiver(cx, site, &mut hoisted);
        if cx.is_discarded(site.node) {
            return Code::with_hoisted(format!("ARRAY_REMOVE({array}, 0, 1)"), hoisted).boxed();
        }
        let element = ty.element().cloned().unwrap_or(NativeType::VOID);
        let first = cx.fresh_local("tmp_shift", &element);
        hoisted.push(format!("{first} = {array}->data[0];"));
        hoisted.push(format!("ARRAY_REMOVE({array}, 0, 1);"));
        Code::with_hoisted(first, hoisted).boxed()
    }
}

/// `arr.unshift(x, ..)`: evaluates to the new length.
pub struct ArrayUnshift;

impl CallResolver for ArrayUnshift {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_dynamic_array(types, site, "unshift")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn escape_target(&self, _: &Ast, _: &TypeTable, _: &CallSite, _: usize) -> EscapeTarget {
        EscapeTarget::Receiver
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() == 0 {
            return cx.wrong_arity(site, "at least 1");
        }
        let mut hoisted = Vec::new();
        let (array, _) = receiver(cx, site, &mut hoisted);
        let values: Vec<String> = site.args.iter().map(|&arg| cx.text(arg, &mut hoisted)).collect();
        for value in values.iter().rev() {
            hoisted.push(format!("ARRAY_INSERT({array}, 0, {value});"));
        }
        let text = if cx.is_discarded(site.node) {
            String::new()
        } else {
            format!("{array}->size")
        };
        Code::with_hoisted(text, hoisted).boxed()
    }
}

/// Bound and element access of an array expression.
fn elements(array: &str, ty: &NativeType) -> (String, String) {
    match ty {
        NativeType::Array(a) if !a.dynamic => (a.capacity.to_string(), array.to_string()),
        _ => (format!("{array}->size"), format!("{array}->data")),
    }
}

/// `arr.indexOf(x)`: a linear search.
pub struct ArrayIndexOf;

impl CallResolver for ArrayIndexOf {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_array(types, site, "indexOf")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        let Some(needle) = site.arg(0).filter(|_| site.arity() == 1) else {
            return cx.wrong_arity(site, "1");
        };
        let mut hoisted = Vec::new();
        let (array, ty) = receiver(cx, site, &mut hoisted);
        let value = cx.text(needle, &mut hoisted);
        let (bound, data) = elements(&array, &ty);
        let result = cx.fresh_local("tmp_index", &NativeType::INT);
        let index = cx.fresh_local("i", &NativeType::INT);

        let found = if ty.element().is_some_and(NativeType::is_str) {
            cx.require(keys::STRING);
            format!("strcmp({data}[{index}], {value}) == 0")
        } else {
            format!("{data}[{index}] == {value}")
        };
        hoisted.push(format!("{result} = -1;"));
        hoisted.push(index_loop(
            &index,
            &bound,
            &[format!(
                "if ({found}) {{\n    {result} = {index};\n    break;\n}}"
            )],
        ));
        Code::with_hoisted(result, hoisted).boxed()
    }
}

/// `arr.join(sep)`: a fresh string, comma separated by default.
pub struct ArrayJoin;

impl CallResolver for ArrayJoin {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_array(types, site, "join")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::STR
    }

    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        Some("tmp_joined".to_string())
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() > 1 {
            return cx.wrong_arity(site, "0 or 1");
        }
        let mut hoisted = Vec::new();
        let (array, ty) = receiver(cx, site, &mut hoisted);
        let separator = match site.arg(0) {
            Some(arg) => cx.text(arg, &mut hoisted),
            None => "\",\"".to_string(),
        };
        let (bound, data) = elements(&array, &ty);
        let element = ty.element().cloned().unwrap_or(NativeType::STR);

        let name = cx.allocation_name(site.node, "tmp_joined");
        let size = cx.fresh_local("tmp_len", &NativeType::INT);
        let index = cx.fresh_local("i", &NativeType::INT);
        let item = format!("{data}[{index}]");
        let (length, append) = match element.as_primitive() {
            Some(Primitive::Str) => (format!("strlen({item})"), "strcat"),
            Some(Primitive::Float) => {
                cx.require(keys::STR_FLOAT_CAT);
                ("STR_FLOAT_BUFLEN".to_string(), "str_float_cat")
            }
            _ => {
                cx.require(keys::STR_INT16_T_CAT);
                ("STR_INT16_T_BUFLEN".to_string(), "str_int16_t_cat")
            }
        };
        cx.require(keys::STDLIB);
        cx.require(keys::STRING);
        cx.require(keys::ASSERT);

        hoisted.push(format!("{size} = 1;"));
        hoisted.push(index_loop(
            &index,
            &bound,
            &[format!(
                "{size} += {length} + strlen({separator});"
            )],
        ));
        hoisted.push(format!("{name} = malloc({size});"));
        hoisted.push(format!("assert({name} != NULL);"));
        hoisted.push(format!("{name}[0] = '\\0';"));
        cx.register_allocation(site.node, &mut hoisted);
        hoisted.push(index_loop(
            &index,
            &bound,
            &[
                format!("if ({index} != 0)\n    strcat({name}, {separator});"),
                format!("{append}({name}, {item});"),
            ],
        ));
        Code::with_hoisted(name, hoisted).boxed()
    }
}
