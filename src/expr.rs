//! Symbolic residual expressions.
//!
//! Differential equations are stated as small expression trees over unknown
//! functions of the independent variables and their partial derivatives.
//! Every equation is arranged so that it reads `residual = 0`; a nonzero
//! source term is injected later by assigning a nonzero sample-set target,
//! never by editing the expression.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::ops;

/// A residual expression node.
///
/// `Deriv` holds the ordered list of independent variables the unknown is
/// differentiated against, so the second time derivative of `x1` is
/// `Deriv { name: "x1", wrt: ["t", "t"] }` and prints as `x1__t__t`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Func(String),
    Deriv { name: String, wrt: Vec<String> },
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

/// Constant term.
pub fn con(value: f64) -> Expr {
    Expr::Const(value)
}

/// An unknown function of the independent variables.
pub fn func(name: impl Into<String>) -> Expr {
    Expr::Func(name.into())
}

/// First partial derivative of `name` with respect to `wrt`.
pub fn d(name: impl Into<String>, wrt: impl Into<String>) -> Expr {
    Expr::Deriv {
        name: name.into(),
        wrt: vec![wrt.into()],
    }
}

/// Second partial derivative of `name` with respect to `wrt`, twice.
pub fn d2(name: impl Into<String>, wrt: impl Into<String>) -> Expr {
    let wrt = wrt.into();
    Expr::Deriv {
        name: name.into(),
        wrt: vec![wrt.clone(), wrt],
    }
}

/// A physical coefficient of an equation.
///
/// A fixed coefficient enters the residual as a constant. A named coefficient
/// is an unknown to be inferred and enters as a new unknown function of the
/// independent variables, exactly like a dependent variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Coeff {
    Fixed(f64),
    Infer(String),
}

impl Coeff {
    /// Lower the coefficient into an expression node.
    pub fn expr(&self) -> Expr {
        match self {
            Coeff::Fixed(value) => Expr::Const(*value),
            Coeff::Infer(name) => Expr::Func(name.clone()),
        }
    }

    /// The unknown's name, when this coefficient is to be inferred.
    pub fn inferred(&self) -> Option<&str> {
        match self {
            Coeff::Fixed(_) => None,
            Coeff::Infer(name) => Some(name),
        }
    }
}

impl From<f64> for Coeff {
    fn from(value: f64) -> Self {
        Coeff::Fixed(value)
    }
}

impl From<&str> for Coeff {
    fn from(name: &str) -> Self {
        Coeff::Infer(name.to_string())
    }
}

impl From<String> for Coeff {
    fn from(name: String) -> Self {
        Coeff::Infer(name)
    }
}

/// Field values at one sample point, supplied by the caller.
///
/// `None` means the field (or that derivative of it) is not known to the
/// environment, which evaluation reports as a configuration error.
pub trait FieldEnv {
    fn value(&self, name: &str) -> Option<f64>;
    fn derivative(&self, name: &str, wrt: &[String]) -> Option<f64>;
}

/// A [`FieldEnv`] backed by closures, for checking residuals against
/// closed-form solutions.
pub struct ClosureEnv<'a> {
    pub value: &'a dyn Fn(&str) -> Option<f64>,
    pub derivative: &'a dyn Fn(&str, &[String]) -> Option<f64>,
}

impl FieldEnv for ClosureEnv<'_> {
    fn value(&self, name: &str) -> Option<f64> {
        (self.value)(name)
    }

    fn derivative(&self, name: &str, wrt: &[String]) -> Option<f64> {
        (self.derivative)(name, wrt)
    }
}

impl Expr {
    /// Evaluate the expression at one point.
    pub fn eval(&self, env: &dyn FieldEnv) -> Result<f64> {
        match self {
            Expr::Const(value) => Ok(*value),
            Expr::Func(name) => env
                .value(name)
                .ok_or_else(|| Error::Config(format!("no value for unknown function '{name}'"))),
            Expr::Deriv { name, wrt } => env.derivative(name, wrt).ok_or_else(|| {
                Error::Config(format!("no value for derivative '{}'", deriv_label(name, wrt)))
            }),
            Expr::Add(a, b) => Ok(a.eval(env)? + b.eval(env)?),
            Expr::Sub(a, b) => Ok(a.eval(env)? - b.eval(env)?),
            Expr::Mul(a, b) => Ok(a.eval(env)? * b.eval(env)?),
            Expr::Neg(a) => Ok(-a.eval(env)?),
        }
    }

    /// Names of every unknown function the expression references, including
    /// those referenced only through derivatives.
    pub fn unknowns(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_unknowns(&mut names);
        names
    }

    /// How many times `name` appears as a bare unknown-function term.
    pub fn count_func(&self, name: &str) -> usize {
        match self {
            Expr::Const(_) => 0,
            Expr::Func(n) => usize::from(n == name),
            Expr::Deriv { .. } => 0,
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
                a.count_func(name) + b.count_func(name)
            }
            Expr::Neg(a) => a.count_func(name),
        }
    }

    fn collect_unknowns(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Const(_) => {}
            Expr::Func(name) | Expr::Deriv { name, .. } => {
                names.insert(name.clone());
            }
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
                a.collect_unknowns(names);
                b.collect_unknowns(names);
            }
            Expr::Neg(a) => a.collect_unknowns(names),
        }
    }
}

/// Derivative naming convention: `x1__t__t` is the second time derivative of
/// `x1`. Sample-set target keys use the same convention.
pub fn deriv_label(name: &str, wrt: &[String]) -> String {
    let mut label = name.to_string();
    for v in wrt {
        label.push_str("__");
        label.push_str(v);
    }
    label
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Func(name) => write!(f, "{name}"),
            Expr::Deriv { name, wrt } => write!(f, "{}", deriv_label(name, wrt)),
            Expr::Add(a, b) => write!(f, "({a} + {b})"),
            Expr::Sub(a, b) => write!(f, "({a} - {b})"),
            Expr::Mul(a, b) => write!(f, "{a}*{b}"),
            Expr::Neg(a) => write!(f, "-{a}"),
        }
    }
}

impl ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl ops::Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Box::new(Expr::Const(self)), Box::new(rhs))
    }
}

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn env_with(values: &'static [(&'static str, f64)]) -> impl FieldEnv {
        struct Fixed(&'static [(&'static str, f64)]);
        impl FieldEnv for Fixed {
            fn value(&self, name: &str) -> Option<f64> {
                self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
            }
            fn derivative(&self, _: &str, _: &[String]) -> Option<f64> {
                None
            }
        }
        Fixed(values)
    }

    #[test]
    fn numeric_coefficients_lower_to_constants() {
        assert_eq!(Coeff::from(2.5).expr(), Expr::Const(2.5));
        assert_eq!(Coeff::Fixed(0.0).expr(), Expr::Const(0.0));
    }

    #[test]
    fn named_coefficients_lower_to_unknown_functions() {
        assert_eq!(Coeff::from("m1").expr(), Expr::Func("m1".into()));
        assert_eq!(Coeff::from("k4".to_string()).expr(), Expr::Func("k4".into()));
    }

    #[test]
    fn lowering_never_reverses() {
        // a numeric coefficient must not produce a function node, nor a named
        // one a constant
        assert!(!matches!(Coeff::Fixed(1.0).expr(), Expr::Func(_)));
        assert!(!matches!(Coeff::from("nu").expr(), Expr::Const(_)));
    }

    #[test]
    fn identical_declarations_compare_equal() {
        let build = || 2.0 * d2("x1", "t") + func("x1") - con(1.0);
        assert_eq!(build(), build());
    }

    #[test]
    fn eval_combines_nodes() {
        let expr = con(3.0) * func("u") - func("v");
        let env = env_with(&[("u", 2.0), ("v", 1.5)]);
        assert_relative_eq!(expr.eval(&env).unwrap(), 4.5);
    }

    #[test]
    fn eval_reports_missing_names() {
        let expr = func("w");
        let env = env_with(&[("u", 2.0)]);
        assert!(expr.eval(&env).is_err());
    }

    #[test]
    fn unknowns_include_derivative_references() {
        let expr = func("m1") * d2("x1", "t") - con(2.0) * func("x2");
        let names: Vec<_> = expr.unknowns().into_iter().collect();
        assert_eq!(names, ["m1", "x1", "x2"]);
    }

    #[test]
    fn derivative_labels_follow_double_underscore_convention() {
        assert_eq!(d2("x1", "t").to_string(), "x1__t__t");
        assert_eq!(d("u", "x").to_string(), "u__x");
    }
}
