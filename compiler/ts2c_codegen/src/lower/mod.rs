//! Construct lowering.
//!
//! Every [`SyntaxKind`] maps to a factory that turns a node into a
//! [`Renderable`]. Factories run once per node; all decisions (temporary
//! names, headers, diagnostics) are taken while lowering, so rendering the
//! result is pure.
//!
//! # Module Structure
//!
//! - `literal.rs`: numbers, strings, booleans, array and object literals
//! - `expr.rs`: operators, assignment, member and index access, calls
//! - `stmt.rs`: declarations, blocks, `if`, `return`, `break`/`continue`
//! - `loops.rs`: `while`, `do`, `for`, `for-of`, `for-in`
//! - `function.rs`: function definitions and their locals
//! - `memory.rs`: allocation bookkeeping and destructors

mod expr;
mod function;
mod literal;
mod loops;
pub(crate) mod memory;
mod stmt;

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use ts2c_diagnostic::{Diagnostic, ErrorCode};
use ts2c_ir::stack::ensure_sufficient_stack;
use ts2c_ir::{scope, Ast, CallSite, Name, NodeId, NodeKind, StringInterner, SyntaxKind};
use ts2c_memory::MemoryPlan;
use ts2c_types::{NativeType, TypeTable};

use crate::registry::{Header, HeaderSet};
use crate::resolve::ResolverChain;
use crate::runtime::{type_dependencies, TypeDependency};
use crate::template::{render, Rendered, Renderable};
use crate::renderable;

pub(crate) use expr::build_string;
pub(crate) use function::{local_declarations, FunctionOutput};
pub(crate) use loops::index_loop;

/// Result of lowering one node.
pub type Lowered = Box<dyn Renderable>;

/// A lowering factory.
pub type LowerFn = fn(&mut LowerCx<'_>, NodeId) -> Lowered;

renderable! {
    /// Text computed while lowering, with the statements it needs first.
    pub struct Code = "{#statements}{hoisted {\n}=> {this}}{/statements}{text}" {
        pub text: String,
        pub hoisted: Vec<String>,
    }
}

impl Code {
    pub fn new(text: impl Into<String>) -> Self {
        Code {
            text: text.into(),
            hoisted: Vec::new(),
        }
    }

    pub fn with_hoisted(text: impl Into<String>, hoisted: Vec<String>) -> Self {
        Code {
            text: text.into(),
            hoisted,
        }
    }

    pub fn empty() -> Self {
        Code::new(String::new())
    }

    pub fn boxed(self) -> Lowered {
        Box::new(self)
    }
}

impl From<Rendered> for Code {
    fn from(rendered: Rendered) -> Self {
        Code {
            text: rendered.inline,
            hoisted: rendered.hoisted,
        }
    }
}

renderable! {
    /// Placeholder for constructs without a lowering rule.
    pub struct Unsupported = "/* Unsupported {kind} */" {
        pub kind: &'static str,
    }
}

/// `SyntaxKind` -> factory.
#[derive(Clone)]
pub struct LoweringTable {
    rules: [Option<LowerFn>; SyntaxKind::COUNT],
}

impl Default for LoweringTable {
    fn default() -> Self {
        LoweringTable {
            rules: [None; SyntaxKind::COUNT],
        }
    }
}

impl LoweringTable {
    /// Rules for every construct of the source language.
    pub fn standard() -> Self {
        let mut table = LoweringTable::default();
        table.register(&[SyntaxKind::Program, SyntaxKind::Block], stmt::lower_statement_list);
        table.register(&[SyntaxKind::VarDecl], stmt::lower_var_decl);
        table.register(&[SyntaxKind::Function], function::lower_function);
        table.register(&[SyntaxKind::ExprStmt], stmt::lower_expr_stmt);
        table.register(&[SyntaxKind::Return], stmt::lower_return);
        table.register(&[SyntaxKind::If], stmt::lower_if);
        table.register(&[SyntaxKind::Break, SyntaxKind::Continue], stmt::lower_jump);
        table.register(&[SyntaxKind::Empty], stmt::lower_empty);
        table.register(&[SyntaxKind::While], loops::lower_while);
        table.register(&[SyntaxKind::DoWhile], loops::lower_do_while);
        table.register(&[SyntaxKind::For], loops::lower_for);
        table.register(&[SyntaxKind::ForOf], loops::lower_for_of);
        table.register(&[SyntaxKind::ForIn], loops::lower_for_in);
        table.register(
            &[
                SyntaxKind::Number,
                SyntaxKind::Str,
                SyntaxKind::Bool,
                SyntaxKind::Null,
                SyntaxKind::Undefined,
            ],
            literal::lower_scalar,
        );
        table.register(&[SyntaxKind::Array], literal::lower_array);
        table.register(&[SyntaxKind::Object], literal::lower_object);
        table.register(&[SyntaxKind::Ident], expr::lower_ident);
        table.register(&[SyntaxKind::Paren], expr::lower_paren);
        table.register(&[SyntaxKind::Binary], expr::lower_binary);
        table.register(&[SyntaxKind::Unary], expr::lower_unary);
        table.register(&[SyntaxKind::Update], expr::lower_update);
        table.register(&[SyntaxKind::Assign], expr::lower_assign);
        table.register(&[SyntaxKind::Conditional], expr::lower_conditional);
        table.register(&[SyntaxKind::Call], expr::lower_call);
        table.register(&[SyntaxKind::Member], expr::lower_member);
        table.register(&[SyntaxKind::Index], expr::lower_index);
        table
    }

    /// Use `rule` for `kinds`, replacing earlier registrations.
    pub fn register(&mut self, kinds: &[SyntaxKind], rule: LowerFn) {
        for &kind in kinds {
            self.rules[kind as usize] = Some(rule);
        }
    }

    pub fn get(&self, kind: SyntaxKind) -> Option<LowerFn> {
        self.rules[kind as usize]
    }
}

/// A local (or, at top level, global) variable invented by lowering.
#[derive(Clone, Debug)]
pub(crate) struct Local {
    pub name: String,
    pub ty: NativeType,
}

/// State shared by all factories while lowering one program.
pub struct LowerCx<'a> {
    pub ast: &'a Ast,
    pub interner: &'a StringInterner,
    pub types: &'a TypeTable,
    pub plan: &'a MemoryPlan,
    pub resolvers: &'a ResolverChain,
    table: &'a LoweringTable,
    headers: HeaderSet,
    diagnostics: Vec<Diagnostic>,
    taken: FxHashSet<String>,
    /// Function node (or the root) -> locals invented there.
    locals: FxHashMap<NodeId, Vec<Local>>,
    function: Option<NodeId>,
    /// Loop -> statements a `continue` runs before jumping back, for loops
    /// whose advance step sits at the end of the body.
    continue_steps: FxHashMap<NodeId, Vec<String>>,
    pub(crate) functions: Vec<FunctionOutput>,
}

/// Names the runtime uses at file scope.
const RUNTIME_NAMES: &[&str] = &[
    "gc_i",
    "gc_main_arrays",
    "gc_main_arrays_c",
    "gc_main_dicts",
    "str_char_at",
    "str_float_cat",
    "array_free_i",
];

impl<'a> LowerCx<'a> {
    pub fn new(
        ast: &'a Ast,
        interner: &'a StringInterner,
        types: &'a TypeTable,
        plan: &'a MemoryPlan,
        resolvers: &'a ResolverChain,
        table: &'a LoweringTable,
    ) -> Self {
        let mut taken: FxHashSet<String> = types
            .symbols()
            .vars()
            .map(|(_, var)| var.c_name.clone())
            .collect();
        taken.extend(plan.temps().iter().map(|(_, temp)| temp.name.clone()));
        taken.extend(RUNTIME_NAMES.iter().map(|name| (*name).to_string()));
        LowerCx {
            ast,
            interner,
            types,
            plan,
            resolvers,
            table,
            headers: HeaderSet::new(),
            diagnostics: Vec::new(),
            taken,
            locals: FxHashMap::default(),
            function: None,
            continue_steps: FxHashMap::default(),
            functions: Vec::new(),
        }
    }

    /// Lower `node` through the table.
    pub fn lower(&mut self, node: NodeId) -> Lowered {
        if self.is_boxed_value(node) {
            return Box::new(Unsupported { kind: "boxed value" });
        }
        let kind = self.ast.syntax_kind(node);
        match self.table.get(kind) {
            Some(rule) => ensure_sufficient_stack(|| rule(self, node)),
            None => self.unsupported(node),
        }
    }

    /// Reads and writes of a variable holding incompatible types. They
    /// have no C form; inference has already reported the variable.
    fn is_boxed_value(&self, node: NodeId) -> bool {
        match self.ast.kind(node) {
            NodeKind::Assign { target, .. } => self.type_of(*target).is_boxed(),
            _ => self.type_of(node).is_boxed(),
        }
    }

    /// Lower and render `node`.
    pub fn render(&mut self, node: NodeId) -> Rendered {
        let lowered = self.lower(node);
        render(lowered.as_ref())
    }

    /// Inline text of `node`; its hoisted statements are appended to
    /// `hoisted`.
    pub fn text(&mut self, node: NodeId, hoisted: &mut Vec<String>) -> String {
        let mut rendered = self.render(node);
        hoisted.append(&mut rendered.hoisted);
        rendered.inline
    }

    pub fn type_of(&self, node: NodeId) -> &'a NativeType {
        self.types.type_of(node)
    }

    pub fn lookup(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// C name of the variable an identifier expression refers to.
    pub fn var_name(&self, node: NodeId) -> Option<&'a str> {
        let types = self.types;
        types
            .symbols()
            .resolve_expr(self.ast, node)
            .map(|var| types.var(var).c_name.as_str())
    }

    /// The value of `node` is thrown away by its statement.
    pub fn is_discarded(&self, node: NodeId) -> bool {
        self.ast
            .parent_skipping_parens(node)
            .is_some_and(|(parent, _)| matches!(self.ast.kind(parent), NodeKind::ExprStmt { .. }))
    }

    pub fn require(&mut self, key: &str) {
        self.headers.require(key);
    }

    pub fn declare(&mut self, header: Rc<dyn Header>) {
        self.headers.declare(header);
    }

    /// Make the definitions `ty` needs available.
    pub fn require_type(&mut self, ty: &NativeType) {
        for dependency in type_dependencies(ty) {
            match dependency {
                TypeDependency::Key(key) => self.headers.require(key),
                TypeDependency::Header(header) => self.headers.declare(header),
            }
        }
    }

    /// Invent a variable of type `ty` in the current function (or as a
    /// global at top level).
    pub fn fresh_local(&mut self, base: &str, ty: &NativeType) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        self.require_type(ty);
        let scope = self.current_scope();
        self.locals.entry(scope).or_default().push(Local {
            name: name.clone(),
            ty: ty.clone(),
        });
        name
    }

    pub(crate) fn take_locals(&mut self, scope: NodeId) -> Vec<Local> {
        self.locals.remove(&scope).unwrap_or_default()
    }

    /// Function being lowered, or the program root.
    pub fn current_scope(&self) -> NodeId {
        self.function.unwrap_or_else(|| self.ast.root())
    }

    pub(crate) fn enter_function(&mut self, function: NodeId) -> Option<NodeId> {
        self.function.replace(function)
    }

    pub(crate) fn leave_function(&mut self, previous: Option<NodeId>) {
        self.function = previous;
    }

    pub fn error(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Report a node without a lowering rule and render a placeholder.
    pub fn unsupported(&mut self, node: NodeId) -> Lowered {
        let kind = self.ast.syntax_kind(node).name();
        self.error(
            Diagnostic::error(ErrorCode::E2004)
                .with_message(format!("`{kind}` cannot be translated to C"))
                .with_label(self.ast.span(node), "unsupported here"),
        );
        Box::new(Unsupported { kind })
    }

    /// Report a standard call with the wrong number of arguments.
    pub fn wrong_arity(&mut self, site: &CallSite, expected: &str) -> Lowered {
        let name = site.method.or(site.function).unwrap_or("call");
        self.error(
            Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "`{name}` takes {expected} argument(s) but {} were supplied",
                    site.arity()
                ))
                .with_label(self.ast.span(site.node), "wrong number of arguments"),
        );
        Box::new(Unsupported {
            kind: SyntaxKind::Call.name(),
        })
    }

    /// Innermost loop of `node` within its function.
    pub fn enclosing_loop(&self, node: NodeId) -> Option<NodeId> {
        scope::enclosing_loop(self.ast, node)
    }

    /// Make every `continue` of `loop_node` run `steps` first.
    pub(crate) fn set_continue_steps(&mut self, loop_node: NodeId, steps: Vec<String>) {
        if !steps.is_empty() {
            self.continue_steps.insert(loop_node, steps);
        }
    }

    /// Steps owed by a `continue` at `node` to its innermost loop.
    pub(crate) fn continue_steps(&self, node: NodeId) -> Vec<String> {
        self.enclosing_loop(node)
            .and_then(|loop_node| self.continue_steps.get(&loop_node))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn into_parts(self) -> (HeaderSet, Vec<Diagnostic>, Vec<FunctionOutput>) {
        (self.headers, self.diagnostics, self.functions)
    }
}

#[cfg(test)]
mod tests;
