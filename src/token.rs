use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Div,
    Pow,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::Times => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Print,
    Ident(String),
    Number(f64),
    Op(Operator),
    LParen,
    RParen,
    Comma,
    Assign,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Print => write!(f, "print"),
            Token::Ident(id) => write!(f, "{}", id),
            Token::Number(n) => write!(f, "{}", n),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Assign => write!(f, "="),
        }
    }
}

/// A token together with the 1-based column it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub column: usize,
}
