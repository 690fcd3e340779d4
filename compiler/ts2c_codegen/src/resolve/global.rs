//! Global functions.

use ts2c_ir::{Ast, CallSite};
use ts2c_types::{NativeType, TypeQuery};

use super::CallResolver;
use crate::lower::{Code, LowerCx, Lowered};
use crate::runtime::keys;

/// `parseInt(s[, radix])`
pub struct ParseInt;

impl CallResolver for ParseInt {
    fn matches(&self, _ast: &Ast, _types: &dyn TypeQuery, site: &CallSite) -> bool {
        site.is_function("parseInt")
    }

    fn return_type(&self, _ast: &Ast, _types: &dyn TypeQuery, _site: &CallSite) -> NativeType {
        NativeType::INT
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered {
        if !(1..=2).contains(&site.arity()) {
            return cx.wrong_arity(site, "1 or 2");
        }
        cx.require(keys::STDLIB);
        let mut hoisted = Vec::new();
        let args: Vec<String> = site.args.iter().map(|&arg| cx.text(arg, &mut hoisted)).collect();
        let text = match args.as_slice() {
            [string, radix] => format!("strtol({string}, NULL, {radix})"),
            [string, ..] => format!("atoi({string})"),
            [] => String::new(),
        };
        Code::with_hoisted(text, hoisted).boxed()
    }
}
