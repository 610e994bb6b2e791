#![allow(dead_code)]

use termdiff::builder::{exp, log, power, sum};
use termdiff::{Term, Variable};

pub fn make_variables(n: usize) -> Vec<Variable> {
    (0..n).map(|_| Variable::new()).collect()
}

pub fn make_input(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.5 + 0.01 * i as f64).collect()
}

// ─── Rosenbrock ────────────────────────────────────────────────────────────

pub fn rosenbrock(v: &[Variable]) -> Term {
    sum((0..v.len() - 1).map(|i| {
        power(1.0 - &v[i], 2) + 100.0 * power(&v[i + 1] - power(&v[i], 2), 2)
    }))
}

// ─── Log-sum-exp ───────────────────────────────────────────────────────────
// Every exponential feeds one shared sum.

pub fn log_sum_exp(v: &[Variable]) -> Term {
    log(sum(v.iter().map(|x| exp(x))))
}

// ─── Shared chain ──────────────────────────────────────────────────────────
// t_{k+1} = t_k * t_k + x_k; each t_k is used twice.

pub fn shared_chain(v: &[Variable]) -> Term {
    let mut t = v[0].term().clone();
    for x in &v[1..] {
        t = &t * &t * 0.5 + x;
    }
    t
}
