#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    Times,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// Syntax tree of a single expression.
///
/// Productions with a single child collapse into that child, so a `Sum`
/// always carries at least one `(op, operand)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Sum(Box<Expr>, Vec<(AddOp, Expr)>),
    Product(Box<Expr>, Vec<(MulOp, Expr)>),
    /// `base ^ exponent`; chains nest to the right.
    Power(Box<Expr>, Box<Expr>),
    Unary(Sign, Box<Expr>),
    Call(String, Vec<Expr>),
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign(String, Expr),
    Definition(Function),
    Print(Expr),
    Expr(Expr),
}
