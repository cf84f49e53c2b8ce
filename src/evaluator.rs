use super::ast::{AddOp, Expr, Function, MulOp, Sign};
use super::builtin;
use super::config::Config;
use super::environment::{Environment, Scope};
use super::error::{Error, ErrorKind, Result};
use tracing::trace;

/// How deep the evaluation currently is: active user calls, and open
/// expression nodes summed over all of those calls.
#[derive(Debug, Clone, Copy, Default)]
struct Depth {
    calls: usize,
    nodes: usize,
}

/// Tree-walking evaluator over a borrowed environment.
///
/// Builtins take precedence over user functions of the same name.
pub struct Evaluator<'e> {
    env: &'e Environment,
    max_call_depth: usize,
    max_eval_depth: usize,
}

impl<'e> Evaluator<'e> {
    pub fn new(env: &'e Environment, config: &Config) -> Self {
        Evaluator {
            env,
            max_call_depth: config.max_call_depth,
            max_eval_depth: config.max_eval_depth,
        }
    }

    pub fn evaluate(&self, e: &Expr, scope: &Scope) -> Result<f64> {
        self.eval_expr(e, scope, Depth::default())
    }

    fn resolve(&self, name: &str, scope: &Scope) -> Result<f64> {
        scope
            .lookup(name)
            .or_else(|| self.env.variable(name))
            .or_else(|| builtin::constant(name))
            .ok_or_else(|| ErrorKind::UndefinedName(name.to_owned()).into())
    }

    fn eval_expr(&self, e: &Expr, scope: &Scope, depth: Depth) -> Result<f64> {
        if depth.nodes >= self.max_eval_depth {
            return Err(ErrorKind::EvaluationDepth(self.max_eval_depth).into());
        }
        let depth = Depth {
            nodes: depth.nodes + 1,
            ..depth
        };

        match e {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => self.resolve(name, scope),
            Expr::Sum(first, rest) => {
                let init = self.eval_expr(first, scope, depth)?;
                rest.iter().try_fold(init, |acc, (op, rhs)| {
                    let rhs = self.eval_expr(rhs, scope, depth)?;
                    Ok(match op {
                        AddOp::Plus => acc + rhs,
                        AddOp::Minus => acc - rhs,
                    })
                })
            }
            Expr::Product(first, rest) => {
                let init = self.eval_expr(first, scope, depth)?;
                rest.iter().try_fold(init, |acc, (op, rhs)| {
                    let rhs = self.eval_expr(rhs, scope, depth)?;
                    Ok(match op {
                        MulOp::Times => acc * rhs,
                        MulOp::Div => acc / rhs,
                    })
                })
            }
            Expr::Power(base, exp) => {
                let base = self.eval_expr(base, scope, depth)?;
                let exp = self.eval_expr(exp, scope, depth)?;
                Ok(base.powf(exp))
            }
            Expr::Unary(sign, operand) => {
                let v = self.eval_expr(operand, scope, depth)?;
                Ok(match sign {
                    Sign::Plus => v,
                    Sign::Minus => -v,
                })
            }
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|a| self.eval_expr(a, scope, depth))
                    .collect::<Result<Vec<_>>>()?;

                if let Some(b) = builtin::lookup(name) {
                    return b.call(&values).map_err(Error::from);
                }
                match self.env.function(name) {
                    Some(func) => self.call_function(func, &values, scope, depth),
                    None => Err(ErrorKind::UnknownFunction(name.clone()).into()),
                }
            }
            Expr::Paren(inner) => self.eval_expr(inner, scope, depth),
        }
    }

    fn call_function(
        &self,
        func: &'e Function,
        args: &[f64],
        scope: &Scope,
        depth: Depth,
    ) -> Result<f64> {
        let arg = match args {
            [arg] => *arg,
            _ => {
                return Err(ErrorKind::Arity {
                    name: func.proto.name.clone(),
                    expected: "1".to_owned(),
                    found: args.len(),
                }
                .into())
            }
        };
        if depth.calls >= self.max_call_depth {
            return Err(ErrorKind::RecursionLimit(self.max_call_depth).into());
        }

        trace!(function = %func.proto.name, arg, calls = depth.calls, nodes = depth.nodes, "call");
        let local = scope.bind(&func.proto.param, arg);
        let depth = Depth {
            calls: depth.calls + 1,
            ..depth
        };
        self.eval_expr(&func.body, &local, depth)
    }
}
