//! Equation sets and the bootcamp's equation definitions.
//!
//! An [`EquationSet`] maps an equation label (`ode_x1`, `diffusion_u`, ...)
//! to its residual expression. Sample-set targets reference equations by
//! label; a target of zero enforces the equation, a nonzero target injects a
//! source term.

use crate::error::{Error, Result};
use crate::expr::{Coeff, Expr, con, d, d2, func};
use std::collections::BTreeSet;

/// An ordered label -> residual map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquationSet {
    equations: Vec<(String, Expr)>,
}

impl EquationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a residual under `label`. Duplicate labels are a configuration
    /// error.
    pub fn insert(&mut self, label: impl Into<String>, residual: Expr) -> Result<()> {
        let label = label.into();
        if self.contains(&label) {
            return Err(Error::Config(format!("duplicate equation label '{label}'")));
        }
        self.equations.push((label, residual));
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Expr> {
        self.equations
            .iter()
            .find_map(|(l, e)| (l == label).then_some(e))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.equations.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.equations.iter().map(|(l, e)| (l.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Every unknown function referenced by any residual.
    pub fn unknowns(&self) -> BTreeSet<String> {
        self.equations
            .iter()
            .flat_map(|(_, e)| e.unknowns())
            .collect()
    }
}

/// Projectile motion: `ode_x: x'' = 0`, `ode_y: y'' = -g`.
pub fn projectile(gravity: f64) -> EquationSet {
    let mut set = EquationSet::new();
    // infallible: labels are distinct literals
    let _ = set.insert("ode_x", d2("x", "t"));
    let _ = set.insert("ode_y", d2("y", "t") + con(gravity));
    set
}

/// Three masses coupled by four springs, outer springs anchored to walls.
///
/// Any mass or spring constant may be declared as a named unknown instead of
/// a number, turning the forward problem into an inverse one without touching
/// the residuals.
pub fn spring_mass(masses: [Coeff; 3], springs: [Coeff; 4]) -> EquationSet {
    let [m1, m2, m3] = masses;
    let [k1, k2, k3, k4] = springs;
    let (x1, x2, x3) = (|| func("x1"), || func("x2"), || func("x3"));
    let mut set = EquationSet::new();
    let _ = set.insert(
        "ode_x1",
        m1.expr() * d2("x1", "t") - k1.expr() * (con(0.0) - x1()) - k2.expr() * (x2() - x1()),
    );
    let _ = set.insert(
        "ode_x2",
        m2.expr() * d2("x2", "t") - k2.expr() * (x1() - x2()) - k3.expr() * (x3() - x2()),
    );
    let _ = set.insert(
        "ode_x3",
        m3.expr() * d2("x3", "t") - k3.expr() * (x2() - x3()) - k4.expr() * (con(0.0) - x3()),
    );
    set
}

/// One-dimensional transient diffusion: `u_t - D * u_xx = 0`.
pub fn diffusion(diffusivity: Coeff) -> EquationSet {
    let mut set = EquationSet::new();
    let _ = set.insert("diffusion_u", d("u", "t") - diffusivity.expr() * d2("u", "x"));
    set
}
