use combine::easy;
use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Fail)]
pub enum ErrorKind {
    #[fail(display = "syntax error at column {}: {}", column, message)]
    Syntax { column: usize, message: String },
    #[fail(display = "undefined variable: {}", _0)]
    UndefinedName(String),
    #[fail(display = "unknown function: {}", _0)]
    UnknownFunction(String),
    #[fail(
        display = "{}() takes {} argument(s) but {} were given",
        name, expected, found
    )]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },
    #[fail(display = "{}(): {}", name, reason)]
    Argument { name: String, reason: String },
    #[fail(display = "maximum call depth of {} exceeded", _0)]
    RecursionLimit(usize),
    #[fail(display = "expression nested more than {} levels deep during evaluation", _0)]
    EvaluationDepth(usize),
    #[fail(display = "could not start evaluation: {}", _0)]
    Resources(String),
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Flattens combine's error list into one line, e.g.
/// "unexpected `)`, expected number or `(`".
pub(crate) fn describe<T, R, F>(errors: &[easy::Error<T, R>], range: F) -> String
where
    T: Display,
    F: Fn(&R) -> String,
{
    let info = |i: &easy::Info<T, R>| match i {
        easy::Info::Token(t) => format!("`{}`", t),
        easy::Info::Range(r) => format!("`{}`", range(r)),
        easy::Info::Owned(s) => s.clone(),
        easy::Info::Static(s) => (*s).to_owned(),
    };

    let mut unexpected = None;
    let mut expected: Vec<String> = Vec::new();
    let mut messages = Vec::new();
    for error in errors {
        match error {
            easy::Error::Unexpected(i) => {
                if unexpected.is_none() {
                    unexpected = Some(info(i));
                }
            }
            easy::Error::Expected(i) => {
                let s = info(i);
                if !expected.contains(&s) {
                    expected.push(s);
                }
            }
            easy::Error::Message(i) => messages.push(info(i)),
            easy::Error::Other(e) => messages.push(e.to_string()),
        }
    }

    let mut parts = Vec::new();
    if let Some(u) = unexpected {
        parts.push(format!("unexpected {}", u));
    }
    match expected.split_last() {
        Some((last, [])) => parts.push(format!("expected {}", last)),
        Some((last, init)) => parts.push(format!("expected {} or {}", init.join(", "), last)),
        None => {}
    }
    parts.extend(messages);
    if parts.is_empty() {
        "invalid input".to_owned()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind() {
        let e = Error::from(ErrorKind::UndefinedName("y".to_owned()));
        assert_eq!(e.kind(), &ErrorKind::UndefinedName("y".to_owned()));
        assert_eq!(e.to_string(), "undefined variable: y");
    }

    #[test]
    fn test_describe() {
        let errors: Vec<easy::Error<char, &str>> = vec![
            easy::Error::Unexpected(easy::Info::Token(')')),
            easy::Error::Expected(easy::Info::Static("number")),
            easy::Error::Expected(easy::Info::Token('(')),
            easy::Error::Expected(easy::Info::Static("number")),
        ];
        assert_eq!(
            describe(&errors, |r| r.to_string()),
            "unexpected `)`, expected number or `(`"
        );
    }
}
