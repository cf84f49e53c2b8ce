use super::ast::{AddOp, Expr, Function, MulOp, Prototype, Sign, Statement};
use super::error::{self, ErrorKind, Result};
use super::token::{Lexeme, Operator, Token};
use combine::error::ParseError;
use combine::parser::{EasyParser, Parser};
use combine::stream::{position, Stream};
use combine::{attempt, between, choice, eof, many, optional, parser, satisfy_map, sep_by, token};

fn ident<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    satisfy_map(|t| match t {
        Token::Ident(id) => Some(id),
        _ => None,
    })
    .expected("identifier")
}

fn op<Input>(o: Operator) -> impl Parser<Input, Output = Operator>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    token(Token::Op(o)).map(move |_| o)
}

fn args<Input>() -> impl Parser<Input, Output = Vec<Expr>>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    sep_by::<Vec<_>, _, _, _>(expr(), token(Token::Comma))
}

fn call<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        ident(),
        between(token(Token::LParen), token(Token::RParen), args()),
    )
        .map(|(id, aa)| Expr::Call(id, aa))
}

fn primary_<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    use super::token::Token::*;
    let number = satisfy_map(|c| match c {
        Number(n) => Some(Expr::Number(n)),
        _ => None,
    })
    .expected("number");

    let paren =
        between(token(LParen), token(RParen), expr()).map(|e| Expr::Paren(Box::new(e)));

    let variable = ident().map(Expr::Variable);

    choice((number, paren, attempt(call()), variable))
}

parser! {
    fn primary[Input]()(Input) -> Expr
        where [Input: Stream<Token=Token>]
    {
        primary_()
    }
}

fn unary<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let sign = choice((
        op(Operator::Plus).map(|_| Sign::Plus),
        op(Operator::Minus).map(|_| Sign::Minus),
    ));

    (optional(sign), primary()).map(|(s, e)| match s {
        Some(s) => Expr::Unary(s, Box::new(e)),
        None => e,
    })
}

fn power_<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (unary(), optional(op(Operator::Pow).with(power()))).map(|(base, exp)| match exp {
        Some(exp) => Expr::Power(Box::new(base), Box::new(exp)),
        None => base,
    })
}

// `a^b^c` recurses on the right operand.
parser! {
    fn power[Input]()(Input) -> Expr
        where [Input: Stream<Token=Token>]
    {
        power_()
    }
}

fn mul<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let mul_op = choice((
        op(Operator::Times).map(|_| MulOp::Times),
        op(Operator::Div).map(|_| MulOp::Div),
    ));

    (power(), many::<Vec<_>, _, _>((mul_op, power()))).map(|(first, rest)| {
        if rest.is_empty() {
            first
        } else {
            Expr::Product(Box::new(first), rest)
        }
    })
}

fn add<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let add_op = choice((
        op(Operator::Plus).map(|_| AddOp::Plus),
        op(Operator::Minus).map(|_| AddOp::Minus),
    ));

    (mul(), many::<Vec<_>, _, _>((add_op, mul()))).map(|(first, rest)| {
        if rest.is_empty() {
            first
        } else {
            Expr::Sum(Box::new(first), rest)
        }
    })
}

fn expr<Input>() -> impl Parser<Input, Output = Expr>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    add()
}

fn prototype<Input>() -> impl Parser<Input, Output = Prototype>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        ident(),
        between(token(Token::LParen), token(Token::RParen), ident()),
    )
        .map(|(name, param)| Prototype { name, param })
}

pub(crate) fn definition<Input>() -> impl Parser<Input, Output = Function>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // commits once `f(x) =` has been read
    (attempt((prototype(), token(Token::Assign))), expr())
        .map(|((proto, _), body)| Function { proto, body })
}

fn assignment<Input>() -> impl Parser<Input, Output = Statement>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (attempt((ident(), token(Token::Assign))), expr())
        .map(|((name, _), e)| Statement::Assign(name, e))
}

fn print_stmt<Input>() -> impl Parser<Input, Output = Statement>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    token(Token::Print)
        .with(between(token(Token::LParen), token(Token::RParen), expr()))
        .map(Statement::Print)
}

pub(crate) fn statement<Input>() -> impl Parser<Input, Output = Statement>
where
    Input: Stream<Token = Token>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((
        definition().map(Statement::Definition),
        assignment(),
        print_stmt(),
        expr().map(Statement::Expr),
    ))
    .skip(eof())
}

/// Parses the lexemes of one non-empty line into a statement.
pub fn parse_statement(lexemes: &[Lexeme]) -> Result<Statement> {
    let tokens: Vec<Token> = lexemes.iter().map(|l| l.token.clone()).collect();
    let column_of = |index: usize| match lexemes.get(index) {
        Some(l) => l.column,
        None => lexemes.last().map_or(1, |l| l.column + l.token.to_string().len()),
    };

    let result = statement().easy_parse(position::Stream::new(tokens.as_slice()));
    match result {
        Ok((stmt, _)) => Ok(stmt),
        Err(e) => Err(ErrorKind::Syntax {
            column: column_of(e.position),
            message: error::describe(&e.errors, |r: &&[Token]| {
                r.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
            }),
        }
        .into()),
    }
}
