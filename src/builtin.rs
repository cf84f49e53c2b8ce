use super::error::ErrorKind;
use std::fmt;

/// Number of arguments a builtin accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Between(lo, hi) => lo <= n && n <= hi,
            Arity::AtLeast(lo) => n >= lo,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{}", k),
            Arity::Between(lo, hi) => write!(f, "{} to {}", lo, hi),
            Arity::AtLeast(lo) => write!(f, "at least {}", lo),
        }
    }
}

type Apply = fn(&[f64]) -> Result<f64, String>;

pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    apply: Apply,
}

impl Builtin {
    /// Checks the argument count, then applies the function.
    pub fn call(&self, args: &[f64]) -> Result<f64, ErrorKind> {
        if !self.arity.accepts(args.len()) {
            return Err(ErrorKind::Arity {
                name: self.name.to_owned(),
                expected: self.arity.to_string(),
                found: args.len(),
            });
        }
        (self.apply)(args).map_err(|reason| ErrorKind::Argument {
            name: self.name.to_owned(),
            reason,
        })
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

const DOMAIN: &str = "math domain error";

fn domain(ok: bool, value: f64) -> Result<f64, String> {
    if ok {
        Ok(value)
    } else {
        Err(DOMAIN.to_owned())
    }
}

fn in_unit(x: f64) -> bool {
    (-1.0..=1.0).contains(&x) || x.is_nan()
}

fn log(args: &[f64]) -> Result<f64, String> {
    let x = args[0];
    if x <= 0.0 {
        return Err(DOMAIN.to_owned());
    }
    match args.get(1) {
        None => Ok(x.ln()),
        Some(&base) if base <= 0.0 => Err(DOMAIN.to_owned()),
        Some(&base) if base == 1.0 => Err("logarithm base must not be 1".to_owned()),
        Some(&base) => Ok(x.ln() / base.ln()),
    }
}

fn round(args: &[f64]) -> Result<f64, String> {
    let x = args[0];
    match args.get(1) {
        None => Ok(x.round_ties_even()),
        Some(&digits) if digits.fract() != 0.0 || !digits.is_finite() => {
            Err("number of digits must be an integer".to_owned())
        }
        // 10^k is not representable past |k| = 308
        Some(&digits) if digits > 308.0 || !x.is_finite() => Ok(x),
        Some(&digits) if digits < -308.0 => Ok(0.0f64.copysign(x)),
        Some(&digits) => {
            let scale = 10f64.powi(digits as i32);
            let scaled = x * scale;
            if scaled.is_finite() {
                Ok(scaled.round_ties_even() / scale)
            } else {
                Ok(x)
            }
        }
    }
}

fn fact(args: &[f64]) -> Result<f64, String> {
    let n = args[0];
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err("only accepts non-negative integral values".to_owned());
    }
    // anything above 170! overflows to inf; stop multiplying once it does
    let mut acc: f64 = 1.0;
    let mut i = 2.0;
    while i <= n && acc.is_finite() {
        acc *= i;
        i += 1.0;
    }
    Ok(acc)
}

// NaN is only picked when it comes first: no comparison against NaN is true.
fn max(args: &[f64]) -> Result<f64, String> {
    Ok(args[1..]
        .iter()
        .fold(args[0], |acc, &v| if v > acc { v } else { acc }))
}

fn min(args: &[f64]) -> Result<f64, String> {
    Ok(args[1..]
        .iter()
        .fold(args[0], |acc, &v| if v < acc { v } else { acc }))
}

/// Differential operators: zero when both operands are equal, otherwise the
/// plain arithmetic result.
fn differential(args: &[f64], op: fn(f64, f64) -> f64) -> Result<f64, String> {
    let (a, b) = (args[0], args[1]);
    Ok(if a == b { 0.0 } else { op(a, b) })
}

macro_rules! unary {
    ($name:expr, $f:expr) => {
        Builtin {
            name: $name,
            arity: Arity::Exact(1),
            apply: |args| Ok($f(args[0])),
        }
    };
}

macro_rules! differential {
    ($name:expr, $op:expr) => {
        Builtin {
            name: $name,
            arity: Arity::Exact(2),
            apply: |args| differential(args, $op),
        }
    };
}

pub static BUILTINS: &[Builtin] = &[
    unary!("sin", f64::sin),
    unary!("cos", f64::cos),
    unary!("tan", f64::tan),
    unary!("sinh", f64::sinh),
    unary!("cosh", f64::cosh),
    unary!("tanh", f64::tanh),
    Builtin {
        name: "sin1",
        arity: Arity::Exact(1),
        apply: |args| domain(in_unit(args[0]), args[0].asin()),
    },
    Builtin {
        name: "cos1",
        arity: Arity::Exact(1),
        apply: |args| domain(in_unit(args[0]), args[0].acos()),
    },
    unary!("tan1", f64::atan),
    Builtin {
        name: "log",
        arity: Arity::Between(1, 2),
        apply: log,
    },
    Builtin {
        name: "log2",
        arity: Arity::Exact(1),
        apply: |args| domain(args[0] > 0.0 || args[0].is_nan(), args[0].log2()),
    },
    Builtin {
        name: "log10",
        arity: Arity::Exact(1),
        apply: |args| domain(args[0] > 0.0 || args[0].is_nan(), args[0].log10()),
    },
    Builtin {
        name: "max",
        arity: Arity::AtLeast(1),
        apply: max,
    },
    Builtin {
        name: "min",
        arity: Arity::AtLeast(1),
        apply: min,
    },
    unary!("trunc", f64::trunc),
    Builtin {
        name: "round",
        arity: Arity::Between(1, 2),
        apply: round,
    },
    unary!("cbrt", f64::cbrt),
    Builtin {
        name: "sqrt",
        arity: Arity::Exact(1),
        apply: |args| domain(args[0] >= 0.0 || args[0].is_nan(), args[0].sqrt()),
    },
    unary!("ceil", f64::ceil),
    unary!("floor", f64::floor),
    Builtin {
        name: "fact",
        arity: Arity::Exact(1),
        apply: fact,
    },
    differential!("dadd", |a, b| a + b),
    differential!("dsub", |a, b| a - b),
    differential!("dmul", |a, b| a * b),
    differential!("ddiv", |a, b| a / b),
    differential!("dexp", f64::powf),
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Named constants, resolved after local and global variables.
pub fn constant(name: &str) -> Option<f64> {
    use std::f64::consts;
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        "inf" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        "tau" => Some(consts::TAU),
        _ => None,
    }
}
