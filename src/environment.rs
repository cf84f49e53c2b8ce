use super::ast::Function;
use std::collections::HashMap;

/// Global variables and user-defined functions of one interpreter.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    variables: HashMap<String, f64>,
    functions: HashMap<String, Function>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Stores `func` under its prototype name, replacing any earlier definition.
    pub fn define_function(&mut self, func: Function) {
        self.functions.insert(func.proto.name.clone(), func);
    }
}

/// Parameter bindings of the active user-function calls.
///
/// Each call links a new frame onto the caller's scope, so the callee sees
/// its own parameter first and then every binding visible to the caller.
/// Frames are never mutated and disappear when the call returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    frame: Option<(&'a str, f64)>,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bind(&'a self, name: &'a str, value: f64) -> Scope<'a> {
        Scope {
            frame: Some((name, value)),
            parent: Some(self),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<f64> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if let Some((n, v)) = s.frame {
                if n == name {
                    return Some(v);
                }
            }
            scope = s.parent;
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::super::ast::{Expr, Prototype};
    use super::*;

    #[test]
    fn test_variables() {
        let mut env = Environment::new();
        assert_eq!(env.variable("x"), None);
        env.set_variable("x", 1.0);
        env.set_variable("x", 2.0);
        assert_eq!(env.variable("x"), Some(2.0));
        assert_eq!(env.variable("y"), None);
    }

    #[test]
    fn test_redefine_function() {
        let mut env = Environment::new();
        let def = |body| Function {
            proto: Prototype {
                name: "f".to_owned(),
                param: "x".to_owned(),
            },
            body,
        };
        env.define_function(def(Expr::Number(1.0)));
        env.define_function(def(Expr::Number(2.0)));
        assert_eq!(env.function("f").map(|f| &f.body), Some(&Expr::Number(2.0)));
        assert!(env.function("g").is_none());
    }

    #[test]
    fn test_scope_shadowing() {
        let root = Scope::empty();
        assert_eq!(root.lookup("x"), None);

        let outer = root.bind("x", 1.0);
        let inner = outer.bind("y", 2.0);
        let shadow = inner.bind("x", 3.0);

        assert_eq!(inner.lookup("x"), Some(1.0));
        assert_eq!(inner.lookup("y"), Some(2.0));
        assert_eq!(shadow.lookup("x"), Some(3.0));
        assert_eq!(outer.lookup("y"), None);
    }
}
