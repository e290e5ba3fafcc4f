//! Constant folding and algebraic simplification over the bound tree.
//!
//! The program is straight-line code, so a single forward pass with a map of
//! known constants is a complete reaching-constants analysis. The map is passed
//! into and returned out of each statement fold; a statement only ever sees
//! constants established by the statements before it.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::UnaryOp,
    bound::{BoundBinaryOp, BoundExpr, BoundProgram, BoundStmt, VarId},
    error::FoldError,
};

type Constants = HashMap<VarId, i32>;

pub fn optimize(program: BoundProgram) -> Result<BoundProgram, FoldError> {
    let BoundProgram { stmts, variable_names, diagnostics } = program;

    let mut constants = Constants::new();
    let mut folded = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        let (stmt, next) = fold_stmt(stmt, constants)?;
        folded.push(stmt);
        constants = next;
    }

    debug!(
        statements = folded.len(),
        known_constants = constants.len(),
        "folded constants"
    );
    Ok(BoundProgram { stmts: folded, variable_names, diagnostics })
}

fn fold_stmt(stmt: BoundStmt, mut constants: Constants) -> Result<(BoundStmt, Constants), FoldError> {
    let stmt = match stmt {
        BoundStmt::Assign { id, value } => {
            let value = fold_expr(value, &constants)?;
            match value.literal() {
                Some(v) => {
                    constants.insert(id, word(v)?);
                }
                None => {
                    constants.remove(&id);
                }
            }
            BoundStmt::Assign { id, value }
        }
        BoundStmt::Print { value } => BoundStmt::Print { value: fold_expr(value, &constants)? },
    };
    Ok((stmt, constants))
}

fn fold_expr(expr: BoundExpr, constants: &Constants) -> Result<BoundExpr, FoldError> {
    Ok(match expr {
        BoundExpr::Int(_) => expr,
        BoundExpr::Var(id) => match constants.get(&id) {
            Some(&c) => BoundExpr::Int(c.into()),
            None => expr,
        },
        BoundExpr::Unary { op, operand } => {
            let operand = fold_expr(*operand, constants)?;
            match (op, operand.literal()) {
                (UnaryOp::Plus, _) => operand,
                (UnaryOp::Minus, Some(v)) => {
                    let negated = word(v)?
                        .checked_neg()
                        .ok_or(FoldError::NegationOverflow { value: v })?;
                    BoundExpr::Int(negated.into())
                }
                (UnaryOp::Minus, None) => BoundExpr::unary(op, operand),
            }
        }
        BoundExpr::Binary { op, left, right } => {
            let left = fold_expr(*left, constants)?;
            let right = fold_expr(*right, constants)?;
            fold_binary(op, left, right)?
        }
    })
}

fn fold_binary(op: BoundBinaryOp, left: BoundExpr, right: BoundExpr) -> Result<BoundExpr, FoldError> {
    use BoundBinaryOp::*;

    Ok(match (op, left.literal(), right.literal()) {
        (Add, _, Some(0)) => left,
        (Add, Some(0), _) => right,
        (Sub, _, Some(0)) => left,
        (Mul, _, Some(1)) => left,
        (Mul, Some(1), _) => right,
        (Div, _, Some(1)) => left,
        // left alone so the zero divisor stays visible in the output
        (Div, Some(_), Some(0)) => BoundExpr::binary(op, left, right),
        (_, Some(a), Some(b)) => BoundExpr::Int(evaluate(op, a, b)?.into()),
        _ => BoundExpr::binary(op, left, right),
    })
}

/// Exact 32-bit evaluation of a binary operation. Division truncates toward zero.
fn evaluate(op: BoundBinaryOp, a: i64, b: i64) -> Result<i32, FoldError> {
    let (x, y) = (word(a)?, word(b)?);
    let result = match op {
        BoundBinaryOp::Add => x.checked_add(y),
        BoundBinaryOp::Sub => x.checked_sub(y),
        BoundBinaryOp::Mul => x.checked_mul(y),
        BoundBinaryOp::Div => x.checked_div(y),
    };
    result.ok_or(FoldError::Overflow { op, left: a, right: b })
}

fn word(value: i64) -> Result<i32, FoldError> {
    i32::try_from(value).map_err(|_| FoldError::LiteralOutOfRange { value })
}
