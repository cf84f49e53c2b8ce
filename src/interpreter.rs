use super::ast::{Expr, Function, Statement};
use super::builtin;
use super::config::Config;
use super::environment::{Environment, Scope};
use super::error::{ErrorKind, Result};
use super::evaluator::Evaluator;
use super::lexer;
use super::parser;
use super::preprocess;
use super::token::{Lexeme, Operator, Token};
use std::panic;
use std::thread;
use tracing::{debug, warn};

/// What a successfully handled line produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The line was `exit` or `quit`.
    Exit,
    /// Blank line.
    Empty,
    /// Result of an assignment or a bare expression.
    Value(f64),
    /// Result of `print(expr)`.
    Printed(f64),
    /// A function was (re)defined.
    Defined(String),
}

impl Outcome {
    /// Text to show the user, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            Outcome::Value(v) => Some(format!("= {}", format_number(*v))),
            Outcome::Printed(v) => Some(format_number(*v)),
            Outcome::Exit | Outcome::Empty | Outcome::Defined(_) => None,
        }
    }
}

pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "nan".to_owned()
    } else if v == f64::INFINITY {
        "inf".to_owned()
    } else if v == f64::NEG_INFINITY {
        "-inf".to_owned()
    } else {
        format!("{:?}", v)
    }
}

/// One calculator session: an environment plus the limits it runs under.
#[derive(Debug, Default)]
pub struct Interpreter {
    env: Environment,
    config: Config,
}

/// Environment write produced by a statement, applied only once the whole
/// statement evaluated.
enum Change {
    Variable(String, f64),
    Function(Function),
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter {
            env: Environment::new(),
            config,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Handles one input line. A failed line leaves the environment as it was.
    pub fn submit(&mut self, line: &str) -> Result<Outcome> {
        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            return Ok(Outcome::Exit);
        }

        let line = preprocess::insert_implicit_multiplication(line);
        let (env, config) = (&self.env, &self.config);
        let (outcome, change) = on_sized_stack(config.stack_size, || {
            let lexemes = lexer::tokenize(&line)?;
            if lexemes.is_empty() {
                return Ok((Outcome::Empty, None));
            }
            check_nesting(&lexemes, config.max_nesting)?;

            let stmt = parser::parse_statement(&lexemes)?;
            debug!(?stmt, "parsed");
            run(env, config, stmt)
        })?;
        self.apply(change);
        Ok(outcome)
    }

    pub fn execute(&mut self, stmt: Statement) -> Result<Outcome> {
        let (env, config) = (&self.env, &self.config);
        let (outcome, change) = on_sized_stack(config.stack_size, || run(env, config, stmt))?;
        self.apply(change);
        Ok(outcome)
    }

    fn apply(&mut self, change: Option<Change>) {
        match change {
            Some(Change::Variable(name, v)) => self.env.set_variable(name, v),
            Some(Change::Function(func)) => {
                if builtin::lookup(&func.proto.name).is_some() {
                    warn!(function = %func.proto.name, "definition is shadowed by the builtin of the same name");
                }
                self.env.define_function(func);
            }
            None => {}
        }
    }
}

fn run(env: &Environment, config: &Config, stmt: Statement) -> Result<(Outcome, Option<Change>)> {
    let eval = |e: &Expr| Evaluator::new(env, config).evaluate(e, &Scope::empty());
    match stmt {
        Statement::Assign(name, e) => {
            let v = eval(&e)?;
            Ok((Outcome::Value(v), Some(Change::Variable(name, v))))
        }
        Statement::Definition(func) => {
            // the body is only checked when the function is called
            let name = func.proto.name.clone();
            Ok((Outcome::Defined(name), Some(Change::Function(func))))
        }
        Statement::Print(e) => Ok((Outcome::Printed(eval(&e)?), None)),
        Statement::Expr(e) => Ok((Outcome::Value(eval(&e)?), None)),
    }
}

/// Runs `f` on a scoped thread with a `stack_size` byte stack, so the
/// recursion budgets in [`Config`] do not depend on the caller's stack.
fn on_sized_stack<T, F>(stack_size: usize, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    thread::scope(|s| {
        let handle = thread::Builder::new()
            .name("dcalc-eval".to_owned())
            .stack_size(stack_size)
            .spawn_scoped(s, f)
            .map_err(|e| ErrorKind::Resources(e.to_string()))?;
        match handle.join() {
            Ok(result) => result,
            Err(panic) => panic::resume_unwind(panic),
        }
    })
}

/// Rejects lines whose parser recursion would exceed `limit`.
///
/// Every open parenthesis adds one level, and so does every `^` of a power
/// chain. A chain ends at the next `+ - * / , =` on its own parenthesis
/// level, but chains of the enclosing levels stay open: the parenthesised
/// operand of `^` is parsed inside that power.
fn check_nesting(lexemes: &[Lexeme], limit: usize) -> Result<()> {
    // chain length per open parenthesis level, innermost last
    let mut chains: Vec<usize> = vec![0];
    let mut open_chains = 0usize;
    let mut prev: Option<&Token> = None;

    for l in lexemes {
        match &l.token {
            Token::LParen => chains.push(0),
            Token::RParen => {
                if chains.len() > 1 {
                    open_chains -= chains.pop().unwrap_or(0);
                }
            }
            Token::Op(Operator::Pow) => {
                if let Some(chain) = chains.last_mut() {
                    *chain += 1;
                    open_chains += 1;
                }
            }
            // a sign right after `^` still belongs to the chain
            Token::Op(Operator::Plus) | Token::Op(Operator::Minus)
                if prev == Some(&Token::Op(Operator::Pow)) => {}
            Token::Op(_) | Token::Comma | Token::Assign => {
                if let Some(chain) = chains.last_mut() {
                    open_chains -= *chain;
                    *chain = 0;
                }
            }
            _ => {}
        }
        let depth = chains.len() - 1;
        if depth + open_chains > limit {
            return Err(ErrorKind::Syntax {
                column: l.column,
                message: format!("expression nested more than {} levels deep", limit),
            }
            .into());
        }
        prev = Some(&l.token);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn submit(interp: &mut Interpreter, line: &str) -> Outcome {
        interp
            .submit(line)
            .unwrap_or_else(|e| panic!("{}: {}", line, e))
    }

    #[test]
    fn test_outcomes() {
        let mut interp = Interpreter::new();
        assert_eq!(submit(&mut interp, ""), Outcome::Empty);
        assert_eq!(submit(&mut interp, " \t"), Outcome::Empty);
        assert_eq!(submit(&mut interp, "x = 5"), Outcome::Value(5.0));
        assert_eq!(submit(&mut interp, "x * 2"), Outcome::Value(10.0));
        assert_eq!(submit(&mut interp, "print(x)"), Outcome::Printed(5.0));
        assert_eq!(
            submit(&mut interp, "f(x) = x^2 + 1"),
            Outcome::Defined("f".to_owned())
        );
        assert_eq!(submit(&mut interp, "f(3)"), Outcome::Value(10.0));
        assert_eq!(submit(&mut interp, "exit"), Outcome::Exit);
        assert_eq!(submit(&mut interp, "  quit\n"), Outcome::Exit);
    }

    #[test]
    fn test_sentinel_is_not_parsed() {
        let mut interp = Interpreter::new();
        assert_eq!(submit(&mut interp, "exit"), Outcome::Exit);
        assert!(interp.submit("exit()").is_err());
        assert!(interp.submit("exit + 1").is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(Outcome::Value(14.0).render(), Some("= 14.0".to_owned()));
        assert_eq!(Outcome::Printed(0.5).render(), Some("0.5".to_owned()));
        assert_eq!(Outcome::Value(f64::NAN).render(), Some("= nan".to_owned()));
        assert_eq!(
            Outcome::Value(f64::NEG_INFINITY).render(),
            Some("= -inf".to_owned())
        );
        assert_eq!(Outcome::Defined("f".to_owned()).render(), None);
        assert_eq!(Outcome::Empty.render(), None);
    }

    #[test]
    fn test_failed_assignment_leaves_environment() {
        let mut interp = Interpreter::new();
        submit(&mut interp, "x = 1");
        assert!(interp.submit("x = y + 1").is_err());
        assert!(interp.submit("x = (1").is_err());
        assert_eq!(interp.environment().variable("x"), Some(1.0));
    }

    #[test]
    fn test_nesting_limit() {
        let mut interp = Interpreter::with_config(Config {
            max_nesting: 10,
            ..Config::default()
        });
        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(submit(&mut interp, &ok), Outcome::Value(1.0));

        let deep = format!("{}1{}", "(".repeat(11), ")".repeat(11));
        match interp.submit(&deep).unwrap_err().kind() {
            ErrorKind::Syntax { column, .. } => assert_eq!(*column, 11),
            k => panic!("unexpected error {:?}", k),
        }

        let chain = vec!["2"; 12].join("^");
        assert!(interp.submit(&chain).is_err());
        let terms = vec!["1^1"; 12].join("+");
        assert_eq!(submit(&mut interp, &terms), Outcome::Value(12.0));
    }

    #[test]
    fn test_power_chain_through_parentheses() {
        let mut interp = Interpreter::new();
        let short = format!("2{}", "^(1+0)".repeat(5));
        assert_eq!(submit(&mut interp, &short), Outcome::Value(2.0));

        let long = format!("2{}", "^(1+0)".repeat(200));
        match interp.submit(&long).unwrap_err().kind() {
            ErrorKind::Syntax { message, .. } => assert!(message.contains("nested"), "{}", message),
            k => panic!("unexpected error {:?}", k),
        }

        // chains of enclosing levels stay open inside parentheses
        let mut interp = Interpreter::with_config(Config {
            max_nesting: 10,
            ..Config::default()
        });
        assert!(interp.submit("2^(2^(2^(2^(2^(2^1)))))").is_err());
        assert_eq!(submit(&mut interp, "2^(2^(2^(2^1)))"), Outcome::Value(65536.0));
    }

    #[test]
    fn test_execute_statement() {
        let mut interp = Interpreter::new();
        let stmt = Statement::Assign("x".to_owned(), Expr::Number(3.0));
        assert_eq!(interp.execute(stmt).unwrap(), Outcome::Value(3.0));
        assert_eq!(interp.environment().variable("x"), Some(3.0));
    }

    #[test]
    fn test_independent_sessions() {
        let mut a = Interpreter::new();
        let mut b = Interpreter::new();
        submit(&mut a, "x = 1");
        assert!(b.submit("x").is_err());
    }
}
