use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::lexer::Token;

/// Nesting limit for parentheses and unary signs
const MAX_DEPTH: usize = 256;

/// Recursive-descent parser for arithmetic expressions
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the token stream into an AST
    pub fn parse(&mut self) -> Result<Expr, ExprError> {
        let expr = self.parse_additive()?;

        if !self.is_at_end() {
            return Err(ExprError::UnexpectedToken(format!("{:?}", self.peek())));
        }

        Ok(expr)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::EOF)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::EOF)
    }

    // Left-associative: 8-2-1 is a flat chain folded as (8-2)-1
    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let first = self.parse_multiplicative()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };

            self.advance();
            rest.push((op, self.parse_multiplicative()?));
        }

        Ok(Expr::chain(first, rest))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.peek() {
                Token::Multiply => BinaryOp::Mul,
                Token::Divide => BinaryOp::Div,
                _ => break,
            };

            self.advance();
            rest.push((op, self.parse_unary()?));
        }

        Ok(Expr::chain(first, rest))
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::UnexpectedToken("expression nested too deeply".to_string()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::unary(UnaryOp::Neg, operand))
            }
            Token::Plus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::unary(UnaryOp::Pos, operand))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.nested(Self::parse_additive)?;
                if !matches!(self.peek(), Token::RightParen) {
                    return Err(ExprError::UnexpectedToken(format!(
                        "expected ')', got {:?}",
                        self.peek()
                    )));
                }
                self.advance();
                Ok(Expr::Grouped(Box::new(expr)))
            }
            token => Err(ExprError::UnexpectedToken(format!("{:?}", token))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Result<Expr, ExprError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    #[test]
    fn test_number() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        // Should be 1 + (2 * 3) due to precedence
        assert_eq!(
            expr,
            Expr::binary(
                Expr::Number(1.0),
                BinaryOp::Add,
                Expr::binary(Expr::Number(2.0), BinaryOp::Mul, Expr::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_same_precedence_is_one_chain() {
        let expr = parse("8 - 2 - 1").unwrap();
        assert_eq!(
            expr,
            Expr::chain(
                Expr::Number(8.0),
                vec![
                    (BinaryOp::Sub, Expr::Number(2.0)),
                    (BinaryOp::Sub, Expr::Number(1.0)),
                ],
            )
        );
    }

    #[test]
    fn test_parentheses() {
        let expr = parse("(1 + 2) * 3").unwrap();
        match expr {
            Expr::Chain { first, rest } => {
                assert!(matches!(*first, Expr::Grouped(_)));
                assert_eq!(rest, vec![(BinaryOp::Mul, Expr::Number(3.0))]);
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn test_long_flat_chain_stays_shallow() {
        let input = format!("{}1", "1+".repeat(200_000));
        match parse(&input).unwrap() {
            Expr::Chain { first, rest } => {
                assert_eq!(*first, Expr::Number(1.0));
                assert_eq!(rest.len(), 200_000);
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed() {
        for input in ["", "1 +", "(1", "1)", "1 2", "*3", "()"] {
            assert!(
                matches!(parse(input), Err(ExprError::UnexpectedToken(_))),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected_not_overflowed() {
        let input = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&input).is_err());

        let input = format!("{}1", "-".repeat(10_000));
        assert!(parse(&input).is_err());

        assert_eq!(
            parse("((-(1)))").unwrap().to_string(),
            "((-(1)))"
        );
    }
}
