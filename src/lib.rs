pub mod ast;
pub mod builtin;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod preprocess;
pub mod token;
pub mod toplevel;

pub use config::Config;
pub use environment::{Environment, Scope};
pub use error::{Error, ErrorKind, Result};
pub use interpreter::{Interpreter, Outcome};
