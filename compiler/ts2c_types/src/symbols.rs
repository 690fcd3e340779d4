//! Variable declarations, scopes and identifier resolution.
//!
//! `var` and function declarations are hoisted to the enclosing function
//! (or the program); `let`/`const` belong to the nearest block, `for`
//! header or loop binding. Every identifier expression is resolved to at
//! most one [`VarId`].
//!
//! C names are assigned here: program-level variables and all functions
//! first, then each function's locals, avoiding C keywords, runtime helper
//! names and each other. Locals are declared at the top of their C
//! function, so sibling blocks' variables must not share a name either.

use rustc_hash::{FxHashMap, FxHashSet};
use ts2c_ir::{scope, Ast, DeclKind, Name, NodeId, NodeKind, StringInterner};

use crate::NativeType;

/// Index of a variable in the [`SymbolTable`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        VarId(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// How a variable was introduced.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Param,
    Function,
}

impl From<DeclKind> for VarKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Var => VarKind::Var,
            DeclKind::Let => VarKind::Let,
            DeclKind::Const => VarKind::Const,
        }
    }
}

/// Everything known about one variable.
#[derive(Clone, Debug)]
pub struct VariableInfo {
    pub name: Name,
    /// Unique C identifier.
    pub c_name: String,
    /// Final type; `void *` until inference finishes. For functions, the
    /// return type.
    pub ty: NativeType,
    /// Identifier nodes that resolve to this variable.
    pub references: Vec<NodeId>,
    /// The `Declarator`, `Param` or `Function` node.
    pub declaration: NodeId,
    /// The value lives on the heap (dynamic array, dict or struct).
    pub requires_allocation: bool,
    pub kind: VarKind,
    /// Owning function; `None` for program-level variables and for all
    /// functions, which are global in C.
    pub function: Option<NodeId>,
    /// Scope node the name is bound in.
    pub scope: NodeId,
}

impl VariableInfo {
    pub fn is_global(&self) -> bool {
        self.function.is_none() && self.kind != VarKind::Function
    }

    pub fn is_function(&self) -> bool {
        self.kind == VarKind::Function
    }

    pub fn is_param(&self) -> bool {
        self.kind == VarKind::Param
    }
}

/// Names a C translation unit cannot use for variables.
const RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "main", "printf", "sprintf", "malloc",
    "realloc", "free", "strlen", "strcmp", "strcat", "strcpy", "strncpy", "strncmp", "memmove",
    "atoi", "exit", "TRUE", "FALSE", "NULL", "js_var", "gc_main", "str_pos", "str_substring",
    "str_split", "str_join", "str_int16_t_cmp", "str_int16_t_cat", "dict_find_pos",
    "tmp_dict_pos", "tmp_dict_pos2", "int16_t", "int32_t", "uint8_t", "uint16_t", "uint32_t",
];

/// Scopes, bindings and variables of one program.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    vars: Vec<VariableInfo>,
    by_declaration: FxHashMap<NodeId, VarId>,
    by_reference: FxHashMap<NodeId, VarId>,
    unresolved: Vec<NodeId>,
}

impl SymbolTable {
    /// Declare, resolve and name every variable of the program.
    pub fn build(ast: &Ast, interner: &StringInterner) -> Self {
        let mut table = SymbolTable::default();
        let mut bindings: FxHashMap<(NodeId, Name), VarId> = FxHashMap::default();
        let nodes = ast.descendants(ast.root());

        for &id in &nodes {
            let declared = match ast.kind(id) {
                NodeKind::Function { name, .. } => Some((
                    *name,
                    scope::defining_scope(ast, id),
                    VarKind::Function,
                    None,
                )),
                NodeKind::Param { name } => {
                    let function = ast.parent(id).unwrap_or_else(|| ast.root());
                    Some((*name, function, VarKind::Param, Some(function)))
                }
                NodeKind::Declarator { name, .. } => {
                    let decl_kind = ast
                        .parent(id)
                        .and_then(|p| match ast.kind(p) {
                            NodeKind::VarDecl { kind, .. } => Some(*kind),
                            _ => None,
                        })
                        .unwrap_or(DeclKind::Var);
                    let scope_node = if decl_kind.is_block_scoped() {
                        block_scope(ast, id)
                    } else {
                        scope::defining_scope(ast, id)
                    };
                    Some((
                        *name,
                        scope_node,
                        VarKind::from(decl_kind),
                        scope::enclosing_function(ast, id),
                    ))
                }
                _ => None,
            };

            let Some((name, scope_node, kind, function)) = declared else {
                continue;
            };
            let var = *bindings.entry((scope_node, name)).or_insert_with(|| {
                let var = VarId::from_index(table.vars.len());
                table.vars.push(VariableInfo {
                    name,
                    c_name: String::new(),
                    ty: NativeType::POINTER,
                    references: Vec::new(),
                    declaration: id,
                    requires_allocation: false,
                    kind,
                    function,
                    scope: scope_node,
                });
                var
            });
            table.by_declaration.insert(id, var);
        }

        for &id in &nodes {
            let NodeKind::Ident { name } = ast.kind(id) else {
                continue;
            };
            let mut current = ast.parent(id);
            let mut found = None;
            while let Some(node) = current {
                if let Some(&var) = bindings.get(&(node, *name)) {
                    found = Some(var);
                    break;
                }
                current = ast.parent(node);
            }
            match found {
                Some(var) => {
                    table.by_reference.insert(id, var);
                    table.vars[var.index()].references.push(id);
                }
                None => table.unresolved.push(id),
            }
        }

        table.assign_c_names(interner);
        table
    }

    fn assign_c_names(&mut self, interner: &StringInterner) {
        let mut global_names: FxHashSet<String> =
            RESERVED.iter().map(|s| (*s).to_string()).collect();

        for var in self.vars.iter_mut().filter(|v| v.function.is_none()) {
            var.c_name = unique_name(&sanitize(interner.lookup(var.name)), &mut global_names);
        }

        let mut per_function: FxHashMap<NodeId, FxHashSet<String>> = FxHashMap::default();
        for var in &mut self.vars {
            let Some(function) = var.function else {
                continue;
            };
            let used = per_function
                .entry(function)
                .or_insert_with(|| global_names.clone());
            var.c_name = unique_name(&sanitize(interner.lookup(var.name)), used);
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn var(&self, id: VarId) -> &VariableInfo {
        &self.vars[id.index()]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VariableInfo {
        &mut self.vars[id.index()]
    }

    pub fn vars(&self) -> impl Iterator<Item = (VarId, &VariableInfo)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId::from_index(i), v))
    }

    /// Variable declared by a `Declarator`, `Param` or `Function` node.
    pub fn declared_by(&self, node: NodeId) -> Option<VarId> {
        self.by_declaration.get(&node).copied()
    }

    /// Variable an identifier expression refers to.
    pub fn resolve(&self, ident: NodeId) -> Option<VarId> {
        self.by_reference.get(&ident).copied()
    }

    /// Variable named by an expression that is a (parenthesized) identifier.
    pub fn resolve_expr(&self, ast: &Ast, expr: NodeId) -> Option<VarId> {
        self.resolve(ast.unparen(expr))
    }

    /// Identifier expressions with no declaration in scope.
    pub fn unresolved(&self) -> &[NodeId] {
        &self.unresolved
    }

    /// The function a call's callee names, if it is a user function.
    pub fn called_function(&self, ast: &Ast, callee: NodeId) -> Option<VarId> {
        self.resolve_expr(ast, callee)
            .filter(|&var| self.var(var).is_function())
    }

    /// Parameter variables of a function declaration, in order.
    pub fn params_of(&self, ast: &Ast, function: NodeId) -> Vec<VarId> {
        match ast.kind(function) {
            NodeKind::Function { params, .. } => params
                .iter()
                .filter_map(|&p| self.declared_by(p))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Nearest node that opens a block scope for `let`/`const`.
fn block_scope(ast: &Ast, id: NodeId) -> NodeId {
    let mut current = ast.parent(id);
    while let Some(node) = current {
        match ast.kind(node) {
            NodeKind::Block { .. }
            | NodeKind::Program { .. }
            | NodeKind::Function { .. }
            | NodeKind::For { .. }
            | NodeKind::ForOf { .. }
            | NodeKind::ForIn { .. } => return node,
            _ => current = ast.parent(node),
        }
    }
    ast.root()
}

/// Identifier characters C does not accept are replaced.
fn sanitize(name: &str) -> String {
    name.replace('$', "_")
}

fn unique_name(base: &str, used: &mut FxHashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests;
