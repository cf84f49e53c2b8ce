use super::error::{self, ErrorKind, Result};
use super::token::{Lexeme, Operator, Token};
use combine::error::{ParseError, StreamError};
use combine::parser::char::{digit, spaces};
use combine::parser::token::position;
use combine::parser::{EasyParser, Parser};
use combine::stream::{self, Stream, StreamErrorFor};
use combine::{choice, eof, many, many1, satisfy, satisfy_map, token};

fn number<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(choice((digit(), token('.'))))
        .and_then(|ns: String| {
            ns.parse::<f64>()
                .map_err(|e| StreamErrorFor::<Input>::other(e))
        })
        .map(Token::Number)
}

fn ident<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        many(satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_')),
    )
        .map(|(first, rest): (char, String)| {
            let mut id = first.to_string();
            id.push_str(&rest);
            match id.as_ref() {
                "print" => Token::Print,
                _ => Token::Ident(id),
            }
        })
}

fn symbol<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    satisfy_map(|c| match c {
        '+' => Some(Token::Op(Operator::Plus)),
        '-' => Some(Token::Op(Operator::Minus)),
        '*' => Some(Token::Op(Operator::Times)),
        '/' => Some(Token::Op(Operator::Div)),
        '^' => Some(Token::Op(Operator::Pow)),
        '(' => Some(Token::LParen),
        ')' => Some(Token::RParen),
        ',' => Some(Token::Comma),
        '=' => Some(Token::Assign),
        _ => None,
    })
    .expected("operator")
}

fn lex<Input>() -> impl Parser<Input, Output = (Input::Position, Token)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (position(), choice((number(), ident(), symbol()))).skip(spaces())
}

pub(crate) fn tokens<Input>() -> impl Parser<Input, Output = Vec<(Input::Position, Token)>>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    spaces().with(many::<Vec<_>, _, _>(lex())).skip(eof())
}

/// Splits a line into tokens, recording the 1-based column of each.
pub fn tokenize(line: &str) -> Result<Vec<Lexeme>> {
    match tokens().easy_parse(stream::position::Stream::new(line)) {
        Ok((tokens, _)) => Ok(tokens
            .into_iter()
            .map(|(pos, token)| Lexeme {
                token,
                column: pos.column as usize,
            })
            .collect()),
        Err(e) => Err(ErrorKind::Syntax {
            column: e.position.column as usize,
            message: error::describe(&e.errors, |r: &&str| r.to_string()),
        }
        .into()),
    }
}

#[cfg(test)]
mod test {
    use super::super::token::Token::*;
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number().easy_parse("1.0").map(|x| x.0), Ok(Number(1.0)));
        assert_eq!(number().easy_parse(".5").map(|x| x.0), Ok(Number(0.5)));
        assert_eq!(number().easy_parse("42").map(|x| x.0), Ok(Number(42.0)));
        assert!(number().easy_parse("1.2.3").is_err());
    }

    #[test]
    fn test_ident() {
        assert_eq!(
            ident().easy_parse("log10").map(|x| x.0),
            Ok(Ident("log10".to_owned()))
        );
        assert_eq!(
            ident().easy_parse("_tmp").map(|x| x.0),
            Ok(Ident("_tmp".to_owned()))
        );

        assert_eq!(ident().easy_parse("print").map(|x| x.0), Ok(Print));
    }

    #[test]
    fn test_symbol() {
        assert_eq!(
            symbol().easy_parse("^").map(|x| x.0),
            Ok(Op(Operator::Pow))
        );
        assert_eq!(symbol().easy_parse("=").map(|x| x.0), Ok(Assign));
        assert!(symbol().easy_parse("$").is_err());
    }

    #[test]
    fn test_tokenize() {
        let lexemes = tokenize(" f(x) =\tx^2 \n").unwrap();
        let tokens: Vec<Token> = lexemes.iter().map(|l| l.token.clone()).collect();
        assert_eq!(
            tokens,
            vec![
                Ident("f".to_owned()),
                LParen,
                Ident("x".to_owned()),
                RParen,
                Assign,
                Ident("x".to_owned()),
                Op(Operator::Pow),
                Number(2.0),
            ]
        );
        assert_eq!(lexemes[0].column, 2);
        assert_eq!(lexemes[4].column, 7);
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_tokenize_bad_char() {
        let e = tokenize("1 + $").unwrap_err();
        match e.kind() {
            ErrorKind::Syntax { column, message } => {
                assert_eq!(*column, 5);
                assert!(message.contains("expected"), "{}", message);
            }
            k => panic!("unexpected error kind {:?}", k),
        }
    }
}
