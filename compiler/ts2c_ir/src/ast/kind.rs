//! Node kinds and the closed construct tag used for lowering dispatch.

use std::fmt;

use smallvec::{smallvec, SmallVec};

use super::{BinaryOp, DeclKind, NodeId, UnaryOp, UpdateOp};
use crate::Name;

/// A syntax node's payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },
    VarDecl {
        kind: DeclKind,
        declarators: Vec<NodeId>,
    },
    Declarator {
        name: Name,
        init: Option<NodeId>,
    },
    Function {
        name: Name,
        params: Vec<NodeId>,
        body: NodeId,
    },
    Param {
        name: Name,
    },
    Block {
        body: Vec<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    /// `for (left of right) body`; `left` is a `VarDecl` or an identifier.
    ForOf {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    /// `for (left in right) body`.
    ForIn {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    Break,
    Continue,
    Empty,
    Number {
        value: f64,
        /// Literal text as written, used for formatting decisions.
        raw: Name,
    },
    Str {
        value: Name,
    },
    Bool {
        value: bool,
    },
    Null,
    Undefined,
    Ident {
        name: Name,
    },
    Array {
        elements: Vec<NodeId>,
    },
    Object {
        properties: Vec<NodeId>,
    },
    Property {
        key: Name,
        value: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: NodeId,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    Assign {
        op: Option<BinaryOp>,
        target: NodeId,
        value: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    /// `object.property`
    Member {
        object: NodeId,
        property: Name,
    },
    /// `object[index]`
    Index {
        object: NodeId,
        index: NodeId,
    },
    Paren {
        expr: NodeId,
    },
}

impl NodeKind {
    /// The field-less construct tag.
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeKind::Program { .. } => SyntaxKind::Program,
            NodeKind::VarDecl { .. } => SyntaxKind::VarDecl,
            NodeKind::Declarator { .. } => SyntaxKind::Declarator,
            NodeKind::Function { .. } => SyntaxKind::Function,
            NodeKind::Param { .. } => SyntaxKind::Param,
            NodeKind::Block { .. } => SyntaxKind::Block,
            NodeKind::ExprStmt { .. } => SyntaxKind::ExprStmt,
            NodeKind::Return { .. } => SyntaxKind::Return,
            NodeKind::If { .. } => SyntaxKind::If,
            NodeKind::While { .. } => SyntaxKind::While,
            NodeKind::DoWhile { .. } => SyntaxKind::DoWhile,
            NodeKind::For { .. } => SyntaxKind::For,
            NodeKind::ForOf { .. } => SyntaxKind::ForOf,
            NodeKind::ForIn { .. } => SyntaxKind::ForIn,
            NodeKind::Break => SyntaxKind::Break,
            NodeKind::Continue => SyntaxKind::Continue,
            NodeKind::Empty => SyntaxKind::Empty,
            NodeKind::Number { .. } => SyntaxKind::Number,
            NodeKind::Str { .. } => SyntaxKind::Str,
            NodeKind::Bool { .. } => SyntaxKind::Bool,
            NodeKind::Null => SyntaxKind::Null,
            NodeKind::Undefined => SyntaxKind::Undefined,
            NodeKind::Ident { .. } => SyntaxKind::Ident,
            NodeKind::Array { .. } => SyntaxKind::Array,
            NodeKind::Object { .. } => SyntaxKind::Object,
            NodeKind::Property { .. } => SyntaxKind::Property,
            NodeKind::Binary { .. } => SyntaxKind::Binary,
            NodeKind::Unary { .. } => SyntaxKind::Unary,
            NodeKind::Update { .. } => SyntaxKind::Update,
            NodeKind::Assign { .. } => SyntaxKind::Assign,
            NodeKind::Conditional { .. } => SyntaxKind::Conditional,
            NodeKind::Call { .. } => SyntaxKind::Call,
            NodeKind::Member { .. } => SyntaxKind::Member,
            NodeKind::Index { .. } => SyntaxKind::Index,
            NodeKind::Paren { .. } => SyntaxKind::Paren,
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> SmallVec<[NodeId; 4]> {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => body.iter().copied().collect(),
            NodeKind::VarDecl { declarators, .. } => declarators.iter().copied().collect(),
            NodeKind::Declarator { init, .. } => init.iter().copied().collect(),
            NodeKind::Function { params, body, .. } => {
                let mut out: SmallVec<[NodeId; 4]> = params.iter().copied().collect();
                out.push(*body);
                out
            }
            NodeKind::ExprStmt { expr } | NodeKind::Paren { expr } => smallvec![*expr],
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out: SmallVec<[NodeId; 4]> = smallvec![*cond, *then_branch];
                out.extend(else_branch.iter().copied());
                out
            }
            NodeKind::While { cond, body } => smallvec![*cond, *body],
            NodeKind::DoWhile { body, cond } => smallvec![*body, *cond],
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                let mut out: SmallVec<[NodeId; 4]> = SmallVec::new();
                out.extend(init.iter().copied());
                out.extend(cond.iter().copied());
                out.extend(update.iter().copied());
                out.push(*body);
                out
            }
            NodeKind::ForOf { left, right, body } | NodeKind::ForIn { left, right, body } => {
                smallvec![*left, *right, *body]
            }
            NodeKind::Array { elements } => elements.iter().copied().collect(),
            NodeKind::Object { properties } => properties.iter().copied().collect(),
            NodeKind::Property { value, .. } => smallvec![*value],
            NodeKind::Binary { left, right, .. } => smallvec![*left, *right],
            NodeKind::Unary { operand, .. } | NodeKind::Update { operand, .. } => {
                smallvec![*operand]
            }
            NodeKind::Assign { target, value, .. } => smallvec![*target, *value],
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => smallvec![*cond, *then_expr, *else_expr],
            NodeKind::Call { callee, args } => {
                let mut out: SmallVec<[NodeId; 4]> = smallvec![*callee];
                out.extend(args.iter().copied());
                out
            }
            NodeKind::Member { object, .. } => smallvec![*object],
            NodeKind::Index { object, index } => smallvec![*object, *index],
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Empty
            | NodeKind::Number { .. }
            | NodeKind::Str { .. }
            | NodeKind::Bool { .. }
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Ident { .. }
            | NodeKind::Param { .. } => SmallVec::new(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::ForOf { .. }
                | NodeKind::ForIn { .. }
        )
    }

    /// Nodes that own a statement list.
    pub fn is_statement_list(&self) -> bool {
        matches!(self, NodeKind::Program { .. } | NodeKind::Block { .. })
    }
}

/// Closed set of construct tags.
///
/// Lowering rules register against these tags; the table is indexed by
/// `SyntaxKind as usize`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum SyntaxKind {
    Program,
    VarDecl,
    Declarator,
    Function,
    Param,
    Block,
    ExprStmt,
    Return,
    If,
    While,
    DoWhile,
    For,
    ForOf,
    ForIn,
    Break,
    Continue,
    Empty,
    Number,
    Str,
    Bool,
    Null,
    Undefined,
    Ident,
    Array,
    Object,
    Property,
    Binary,
    Unary,
    Update,
    Assign,
    Conditional,
    Call,
    Member,
    Index,
    Paren,
}

impl SyntaxKind {
    /// Number of construct tags.
    pub const COUNT: usize = SyntaxKind::Paren as usize + 1;

    /// Human-readable construct name, as it appears in placeholders.
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::Program => "Program",
            SyntaxKind::VarDecl => "VariableStatement",
            SyntaxKind::Declarator => "VariableDeclaration",
            SyntaxKind::Function => "FunctionDeclaration",
            SyntaxKind::Param => "Parameter",
            SyntaxKind::Block => "Block",
            SyntaxKind::ExprStmt => "ExpressionStatement",
            SyntaxKind::Return => "ReturnStatement",
            SyntaxKind::If => "IfStatement",
            SyntaxKind::While => "WhileStatement",
            SyntaxKind::DoWhile => "DoStatement",
            SyntaxKind::For => "ForStatement",
            SyntaxKind::ForOf => "ForOfStatement",
            SyntaxKind::ForIn => "ForInStatement",
            SyntaxKind::Break => "BreakStatement",
            SyntaxKind::Continue => "ContinueStatement",
            SyntaxKind::Empty => "EmptyStatement",
            SyntaxKind::Number => "NumericLiteral",
            SyntaxKind::Str => "StringLiteral",
            SyntaxKind::Bool => "BooleanLiteral",
            SyntaxKind::Null => "NullKeyword",
            SyntaxKind::Undefined => "UndefinedKeyword",
            SyntaxKind::Ident => "Identifier",
            SyntaxKind::Array => "ArrayLiteralExpression",
            SyntaxKind::Object => "ObjectLiteralExpression",
            SyntaxKind::Property => "PropertyAssignment",
            SyntaxKind::Binary => "BinaryExpression",
            SyntaxKind::Unary => "PrefixUnaryExpression",
            SyntaxKind::Update => "UpdateExpression",
            SyntaxKind::Assign => "AssignmentExpression",
            SyntaxKind::Conditional => "ConditionalExpression",
            SyntaxKind::Call => "CallExpression",
            SyntaxKind::Member => "PropertyAccessExpression",
            SyntaxKind::Index => "ElementAccessExpression",
            SyntaxKind::Paren => "ParenthesizedExpression",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
