use crate::error::ExprError;

/// Token types for substituted arithmetic expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    EOF,
}

/// Lexer for the restricted grammar: digits, `.`, `+ - * /`, parentheses
/// and whitespace. Anything else is rejected before parsing starts.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            match self.next_token()? {
                Token::EOF => break,
                token => tokens.push(token),
            }
        }

        tokens.push(Token::EOF);
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.input[self.position].is_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.position += 1;
        c
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::EOF),
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Multiply,
            '/' => Token::Divide,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '0'..='9' | '.' => return self.read_number(),
            _ => {
                return Err(ExprError::UnexpectedChar {
                    ch: c,
                    position: self.position,
                })
            }
        };

        self.advance();
        Ok(token)
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let start = self.position;
        let mut s = String::new();
        let mut has_dot = false;

        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    s.push(c);
                    self.advance();
                }
                '.' if !has_dot => {
                    has_dot = true;
                    s.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        s.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::InvalidNumber {
                text: s,
                position: start,
            })
    }
}
