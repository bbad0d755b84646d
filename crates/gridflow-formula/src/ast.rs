/// Abstract Syntax Tree for arithmetic expressions
///
/// Runs of operators at the same precedence level are kept flat in a
/// [`Expr::Chain`], so tree depth only grows with parentheses and unary signs.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),

    // Left-associative operator chain: first op0 rest0 op1 rest1 ...
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },

    // Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    // Parenthesized expression
    Grouped(Box<Expr>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Pos, // +
}

impl Expr {
    /// Create an operator chain; a chain without operators is its first operand
    pub fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Self {
        if rest.is_empty() {
            return first;
        }
        Expr::Chain {
            first: Box::new(first),
            rest,
        }
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::chain(left, vec![(op, right)])
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Chain { first, rest } => {
                write!(f, "{}", first)?;
                for (op, operand) in rest {
                    write!(f, "{}{}", op, operand)?;
                }
                Ok(())
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Pos => write!(f, "+{}", operand),
            },
            Expr::Grouped(inner) => write!(f, "({})", inner),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_without_operators_collapses() {
        assert_eq!(Expr::chain(Expr::Number(1.0), Vec::new()), Expr::Number(1.0));
    }

    #[test]
    fn test_display_round_trips_structure() {
        let expr = Expr::binary(
            Expr::Number(1.5),
            BinaryOp::Mul,
            Expr::Grouped(Box::new(Expr::binary(
                Expr::unary(UnaryOp::Neg, Expr::Number(2.0)),
                BinaryOp::Add,
                Expr::Number(3.0),
            ))),
        );
        assert_eq!(expr.to_string(), "1.5*(-2+3)");
    }
}
