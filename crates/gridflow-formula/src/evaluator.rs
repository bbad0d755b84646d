//! Pure interpreter for substituted arithmetic expressions.
//!
//! The input never contains references: the formula engine has already
//! replaced them with numeric literals. Evaluation is a total function over
//! the expression tree; every failure comes back as an [`ExprError`].

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Lex, parse and evaluate an expression such as `(1)+(2.5)*3`
pub fn evaluate_expression(expression: &str) -> Result<f64, ExprError> {
    let tokens = Lexer::new(expression).tokenize()?;
    let ast = Parser::new(tokens).parse()?;
    evaluate(&ast)
}

/// Evaluate an expression AST to a number
pub fn evaluate(expr: &Expr) -> Result<f64, ExprError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Grouped(inner) => evaluate(inner),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand)?;
            Ok(match op {
                UnaryOp::Neg => -value,
                UnaryOp::Pos => value,
            })
        }
        Expr::Chain { first, rest } => rest
            .iter()
            .try_fold(evaluate(first)?, |left, (op, right)| {
                evaluate_binary(left, *op, evaluate(right)?)
            }),
    }
}

fn evaluate_binary(left: f64, op: BinaryOp, right: f64) -> Result<f64, ExprError> {
    let result = match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => {
            if right == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            left / right
        }
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(ExprError::NonFinite)
    }
}
