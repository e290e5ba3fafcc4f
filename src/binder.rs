//! Name resolution and semantic checks.
//!
//! Binding never fails: each problem becomes a [`Diagnostic`] and the offending
//! subtree is replaced by a zero literal so the rest of the program still binds.

use tracing::debug;

use crate::{
    ast::{BinaryOp, Expr, Program, Stmt},
    bound::{BoundBinaryOp, BoundExpr, BoundProgram, BoundStmt, VarId},
    diagnostic::Diagnostic,
};

pub fn bind(program: Program) -> BoundProgram {
    let mut binder = Binder::default();
    let stmts = program
        .stmts
        .into_iter()
        .map(|stmt| binder.bind_stmt(stmt))
        .collect();

    let mut variables = binder.variables;
    variables.sort_by_key(|(id, _)| *id);
    let variable_names: Vec<String> = variables.into_iter().map(|(_, name)| name).collect();

    debug!(
        variables = variable_names.len(),
        diagnostics = binder.diagnostics.len(),
        "bound program"
    );
    BoundProgram { stmts, variable_names, diagnostics: binder.diagnostics }
}

#[derive(Default)]
struct Binder {
    // variables whose assignment has been bound so far, in program order
    variables: Vec<(VarId, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl Binder {
    fn lookup(&self, name: &str) -> Option<VarId> {
        self.variables.iter().find(|(_, n)| n == name).map(|(id, _)| *id)
    }

    fn error(&mut self, message: String) {
        self.diagnostics.push(Diagnostic::error(message));
    }

    fn bind_stmt(&mut self, stmt: Stmt) -> BoundStmt {
        match stmt {
            Stmt::Assign { name, value } => {
                // the right-hand side cannot see the variable it defines
                let value = self.bind_expr(value);
                let id = match self.lookup(&name) {
                    Some(id) => id,
                    None => {
                        let id = VarId(self.variables.len());
                        self.variables.push((id, name));
                        id
                    }
                };
                BoundStmt::Assign { id, value }
            }
            Stmt::Print { value } => BoundStmt::Print { value: self.bind_expr(value) },
        }
    }

    fn bind_expr(&mut self, expr: Expr) -> BoundExpr {
        match expr {
            Expr::Int(value) => {
                if i32::try_from(value).is_err() {
                    self.error(format!("integer literal out of 32-bit range: {value}"));
                }
                BoundExpr::Int(value)
            }
            Expr::Var(name) => match self.lookup(&name) {
                Some(id) => BoundExpr::Var(id),
                None => {
                    self.error(format!("use of undefined variable `{name}`"));
                    BoundExpr::Int(0)
                }
            },
            Expr::Unary { op, operand } => BoundExpr::unary(op, self.bind_expr(*operand)),
            Expr::Binary { op, left, right } => {
                let bound_op = match op {
                    BinaryOp::Add => Some(BoundBinaryOp::Add),
                    BinaryOp::Sub => Some(BoundBinaryOp::Sub),
                    BinaryOp::Mul => Some(BoundBinaryOp::Mul),
                    BinaryOp::Div => Some(BoundBinaryOp::Div),
                    BinaryOp::Rem => {
                        self.error(format!("unsupported binary operator `{op}`"));
                        None
                    }
                };

                let left = self.bind_expr(*left);
                let right = self.bind_expr(*right);

                // syntactic check only: a variable holding zero is not caught here
                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && right.literal() == Some(0) {
                    self.error("division by zero".to_string());
                }

                match bound_op {
                    Some(op) => BoundExpr::binary(op, left, right),
                    None => BoundExpr::Int(0),
                }
            }
        }
    }
}
