//! String methods.

use ts2c_ir::{Ast, CallSite};
use ts2c_types::{NativeType, TypeQuery, TypeTable};

use super::{receiver_type, CallResolver};
use crate::lower::{build_string, Code, LowerCx, Lowered};
use crate::runtime::keys;

fn on_string(types: &dyn TypeQuery, site: &CallSite, name: &str) -> bool {
    site.is_method(name) && receiver_type(types, site).is_some_and(|ty| ty.is_str())
}

/// Texts of the receiver and every argument, in evaluation order.
fn operands(cx: &mut LowerCx<'_>, site: &CallSite, hoisted: &mut Vec<String>) -> (String, Vec<String>) {
    let receiver = match site.receiver {
        Some(node) => cx.text(node, hoisted),
        None => String::new(),
    };
    let args = site.args.iter().map(|&arg| cx.text(arg, hoisted)).collect();
    (receiver, args)
}

/// `s.indexOf(search)`
pub struct StrIndexOf;

impl CallResolver for StrIndexOf {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "indexOf")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() != 1 {
            return cx.wrong_arity(site, "1");
        }
        cx.require(keys::STR_POS);
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        Code::with_hoisted(format!("str_pos({string}, {})", args[0]), hoisted).boxed()
    }
}

/// `s.charAt(i)`: a fresh one-character string.
pub struct StrCharAt;

impl CallResolver for StrCharAt {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "charAt")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::STR
    }

    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        Some("tmp_char".to_string())
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() > 1 {
            return cx.wrong_arity(site, "0 or 1");
        }
        cx.require(keys::STR_CHAR_AT);
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        let position = args.first().map_or("0", String::as_str);
        let name = cx.allocation_name(site.node, "tmp_char");
        hoisted.push(format!("{name} = str_char_at({string}, {position});"));
        cx.register_allocation(site.node, &mut hoisted);
        Code::with_hoisted(name, hoisted).boxed()
    }
}

/// `s.charCodeAt(i)`
pub struct StrCharCodeAt;

impl CallResolver for StrCharCodeAt {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "charCodeAt")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() > 1 {
            return cx.wrong_arity(site, "0 or 1");
        }
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        let position = args.first().map_or("0", String::as_str);
        Code::with_hoisted(format!("{string}[{position}]"), hoisted).boxed()
    }
}

/// `s.substring(start[, end])`: a fresh string.
pub struct StrSubstring;

impl CallResolver for StrSubstring {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "substring")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::STR
    }

    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        Some("tmp_substring".to_string())
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if !(1..=2).contains(&site.arity()) {
            return cx.wrong_arity(site, "1 or 2");
        }
        cx.require(keys::STR_SUBSTRING);
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        let end = match args.get(1) {
            Some(end) => end.clone(),
            None => format!("strlen({string})"),
        };
        let name = cx.allocation_name(site.node, "tmp_substring");
        hoisted.push(format!("{name} = str_substring({string}, {}, {end});", args[0]));
        cx.register_allocation(site.node, &mut hoisted);
        Code::with_hoisted(name, hoisted).boxed()
    }
}

/// `s.split(separator)`: a fresh array owning fresh strings.
pub struct StrSplit;

impl CallResolver for StrSplit {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "split")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::array(NativeType::STR, 0, true)
    }

    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        Some("tmp_split".to_string())
    }

    fn owns_contents(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if site.arity() != 1 {
            return cx.wrong_arity(site, "1");
        }
        cx.require(keys::STR_SPLIT);
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        let name = cx.allocation_name(site.node, "tmp_split");
        hoisted.push(format!("ARRAY_CREATE({name}, 2, 0);"));
        cx.register_allocation(site.node, &mut hoisted);
        hoisted.push(format!("str_split({name}, {string}, {});", args[0]));
        Code::with_hoisted(name, hoisted).boxed()
    }
}

/// `s.concat(a, ..)`: a fresh string.
pub struct StrConcat;

impl CallResolver for StrConcat {
    fn matches(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool {
        on_string(types, site, "concat")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::STR
    }

    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        true
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        Some("tmp_string".to_string())
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        let mut hoisted = Vec::new();
        let (string, args) = operands(cx, site, &mut hoisted);
        let mut parts = vec![(string, NativeType::STR)];
        for (text, &arg) in args.into_iter().zip(&site.args) {
            parts.push((text, cx.type_of(arg).clone()));
        }
        let name = cx.allocation_name(site.node, "tmp_string");
        hoisted.extend(build_string(cx, site.node, &name, &parts));
        Code::with_hoisted(name, hoisted).boxed()
    }
}
