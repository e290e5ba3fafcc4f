//! Semantically resolved tree. Variables are dense integer ids instead of names.

use std::fmt;

use crate::{ast::UnaryOp, diagnostic::Diagnostic};

/// Index into `BoundProgram::variable_names`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Operators that survive binding. Remainder is rejected before this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BoundBinaryOp {
    /// IR mnemonic for the operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BoundBinaryOp::Add => "add",
            BoundBinaryOp::Sub => "sub",
            BoundBinaryOp::Mul => "mul",
            BoundBinaryOp::Div => "div",
        }
    }
}

impl fmt::Display for BoundBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundBinaryOp::Add => "+",
            BoundBinaryOp::Sub => "-",
            BoundBinaryOp::Mul => "*",
            BoundBinaryOp::Div => "/",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundExpr {
    Int(i64),
    Var(VarId),
    Unary { op: UnaryOp, operand: Box<BoundExpr> },
    Binary { op: BoundBinaryOp, left: Box<BoundExpr>, right: Box<BoundExpr> },
}

impl BoundExpr {
    pub fn unary(op: UnaryOp, operand: BoundExpr) -> Self {
        BoundExpr::Unary { op, operand: Box::new(operand) }
    }

    pub fn binary(op: BoundBinaryOp, left: BoundExpr, right: BoundExpr) -> Self {
        BoundExpr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    /// The literal value, if this node is one.
    pub fn literal(&self) -> Option<i64> {
        match self {
            BoundExpr::Int(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundStmt {
    Assign { id: VarId, value: BoundExpr },
    Print { value: BoundExpr },
}

/// Output of the binder.
///
/// Every `VarId` in `stmts` is below `variable_names.len()`; index `i` of
/// `variable_names` is the source name of variable `VarId(i)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundProgram {
    pub stmts: Vec<BoundStmt>,
    pub variable_names: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BoundProgram {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn variable_name(&self, id: VarId) -> Option<&str> {
        self.variable_names.get(id.index()).map(String::as_str)
    }
}
