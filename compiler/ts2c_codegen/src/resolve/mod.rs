//! Lowering of calls the program does not define itself.
//!
//! A [`CallResolver`] claims calls by shape and type (`arr.push(x)`,
//! `console.log(..)`), types their results, describes their memory
//! behaviour and lowers them. The [`ResolverChain`] asks platform plugins
//! first, newest first, then the standard resolvers. Calls nobody claims
//! are emitted as written.

mod array;
mod console;
mod global;
mod string;

use std::rc::Rc;

use ts2c_ir::{Ast, CallSite, NodeId, StringInterner};
use ts2c_memory::{CallEscapes, EscapeTarget};
use ts2c_types::{CallOracle, NativeType, TypeQuery, TypeTable};

use crate::lower::{LowerCx, Lowered};

pub use array::{ArrayIndexOf, ArrayJoin, ArrayPop, ArrayPush, ArrayShift, ArrayUnshift};
pub use console::ConsoleLog;
pub use global::ParseInt;
pub use string::{StrCharAt, StrCharCodeAt, StrConcat, StrIndexOf, StrSplit, StrSubstring};

/// Typing, memory behaviour and lowering of one family of calls.
pub trait CallResolver {
    fn matches(&self, ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> bool;

    fn return_type(&self, ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> NativeType;

    /// The call returns a fresh heap value.
    fn needs_disposal(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        false
    }

    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        None
    }

    /// The returned array owns the heap values stored in it.
    fn owns_contents(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        false
    }

    /// Where the argument at `index` ends up.
    fn escape_target(
        &self,
        _ast: &Ast,
        _types: &TypeTable,
        _site: &CallSite,
        _index: usize,
    ) -> EscapeTarget {
        EscapeTarget::None
    }

    fn lower(&self, cx: &mut LowerCx<'_>, site: &CallSite) -> Lowered;
}

/// View of a plugin as a plain resolver.
pub trait AsResolver {
    fn as_resolver(&self) -> &dyn CallResolver;
}

impl<T: CallResolver> AsResolver for T {
    fn as_resolver(&self) -> &dyn CallResolver {
        self
    }
}

/// A platform resolver. Besides calls it may force types onto
/// expressions and claim global names.
pub trait Plugin: AsResolver + CallResolver {
    fn declare_types(
        &self,
        _ast: &Ast,
        _interner: &StringInterner,
        _node: NodeId,
    ) -> Option<NativeType> {
        None
    }

    /// Globals the platform provides.
    fn globals(&self) -> &[&str] {
        &[]
    }
}

/// Plugins and standard resolvers in dispatch order.
#[derive(Clone, Default)]
pub struct ResolverChain {
    plugins: Vec<Rc<dyn Plugin>>,
    standard: Vec<Rc<dyn CallResolver>>,
}

impl ResolverChain {
    /// The standard resolvers and no plugins.
    pub fn standard() -> Self {
        let standard: Vec<Rc<dyn CallResolver>> = vec![
            Rc::new(ConsoleLog),
            Rc::new(ArrayPush),
            Rc::new(ArrayPop),
            Rc::new(ArrayShift),
            Rc::new(ArrayUnshift),
            Rc::new(ArrayIndexOf),
            Rc::new(ArrayJoin),
            Rc::new(StrIndexOf),
            Rc::new(StrCharAt),
            Rc::new(StrCharCodeAt),
            Rc::new(StrSubstring),
            Rc::new(StrSplit),
            Rc::new(StrConcat),
            Rc::new(ParseInt),
        ];
        ResolverChain {
            plugins: Vec::new(),
            standard,
        }
    }

    /// Add a plugin; it is consulted before everything registered so far.
    pub fn register_plugin(&mut self, plugin: Rc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn register_standard(&mut self, resolver: Rc<dyn CallResolver>) {
        self.standard.push(resolver);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// The resolver responsible for `site`.
    pub fn find(
        &self,
        ast: &Ast,
        types: &dyn TypeQuery,
        site: &CallSite,
    ) -> Option<&dyn CallResolver> {
        let found = self
            .plugins
            .iter()
            .rev()
            .find(|plugin| plugin.matches(ast, types, site))
            .map(|plugin| plugin.as_resolver())
            .or_else(|| {
                self.standard
                    .iter()
                    .find(|resolver| resolver.matches(ast, types, site))
                    .map(AsRef::as_ref)
            });
        tracing::trace!(
            method = site.method,
            function = site.function,
            resolved = found.is_some(),
            "resolve call"
        );
        found
    }
}

impl CallOracle for ResolverChain {
    fn call_type(&self, ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> Option<NativeType> {
        self.find(ast, types, site)
            .map(|resolver| resolver.return_type(ast, types, site))
    }

    fn declare_types(
        &self,
        ast: &Ast,
        interner: &StringInterner,
        node: NodeId,
    ) -> Option<NativeType> {
        self.plugins
            .iter()
            .rev()
            .find_map(|plugin| plugin.declare_types(ast, interner, node))
    }

    fn is_known_global(&self, name: &str) -> bool {
        self.plugins
            .iter()
            .any(|plugin| plugin.globals().contains(&name))
    }
}

impl CallEscapes for ResolverChain {
    fn needs_disposal(&self, ast: &Ast, types: &TypeTable, site: &CallSite) -> bool {
        self.find(ast, types, site)
            .is_some_and(|resolver| resolver.needs_disposal(ast, types, site))
    }

    fn temp_var_name(&self, ast: &Ast, types: &TypeTable, site: &CallSite) -> Option<String> {
        self.find(ast, types, site)
            .and_then(|resolver| resolver.temp_var_name(ast, types, site))
    }

    fn owns_contents(&self, ast: &Ast, types: &TypeTable, site: &CallSite) -> bool {
        self.find(ast, types, site)
            .is_some_and(|resolver| resolver.owns_contents(ast, types, site))
    }

    fn escape_target(
        &self,
        ast: &Ast,
        types: &TypeTable,
        site: &CallSite,
        index: usize,
    ) -> EscapeTarget {
        self.find(ast, types, site)
            .map_or(EscapeTarget::Global, |resolver| {
                resolver.escape_target(ast, types, site, index)
            })
    }
}

/// Type of the receiver of a method call.
pub(crate) fn receiver_type(types: &dyn TypeQuery, site: &CallSite) -> Option<NativeType> {
    site.receiver.map(|receiver| types.node_type(receiver))
}
