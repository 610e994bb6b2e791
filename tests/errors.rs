use std::collections::HashMap;

use termdiff::builder::{log, piecewise, power};
use termdiff::{
    differentiate, evaluate, evaluate_at, CompiledDifferentiator, Error, Inequality, Term, TermVec,
    Variable,
};

// ── Construction ──

#[test]
fn raw_sum_needs_two_terms() {
    let x = Variable::new();
    assert!(matches!(Term::sum(vec![x.term().clone()]), Err(Error::InvalidTerm(_))));
    assert!(matches!(Term::sum(Vec::new()), Err(Error::InvalidTerm(_))));
}

#[test]
fn piecewise_needs_a_piece() {
    assert!(matches!(Term::piecewise(Vec::new()), Err(Error::InvalidTerm(_))));
    assert!(matches!(piecewise(Vec::new()), Err(Error::InvalidTerm(_))));
}

#[test]
fn term_vec_needs_a_component() {
    assert!(matches!(TermVec::new(Vec::<Term>::new()), Err(Error::InvalidTerm(_))));
}

// ── Evaluation ──

#[test]
fn missing_variable_value() {
    let x = Variable::new();
    let y = Variable::new();
    let f = &x + &y;
    let values = HashMap::from([(x, 1.0)]);
    assert_eq!(evaluate(&f, &values), Err(Error::MissingVariableValue));
}

#[test]
fn evaluator_rejects_piecewise() {
    let x = Variable::new();
    let f = piecewise([(Inequality::always_true(), x.term().clone())]).unwrap();
    assert!(matches!(
        evaluate_at(&f, &[x], &[1.0]),
        Err(Error::NotSupported(_))
    ));
}

#[test]
fn length_mismatch_is_reported() {
    let x = Variable::new();
    let y = Variable::new();
    let f = &x * &y;
    let vars = [x, y];
    assert_eq!(
        evaluate_at(&f, &vars, &[1.0]),
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        differentiate(&f, &vars, &[1.0, 2.0, 3.0]),
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
}

// ── Logarithm guard, every path ──

#[test]
fn log_of_negative_fails_everywhere() {
    let x = Variable::new();
    let f = log(&x);
    let vars = [x];
    let expected = Err(Error::NonPositiveLogarithmArgument(-1.0));

    assert_eq!(evaluate_at(&f, &vars, &[-1.0]), expected);
    assert_eq!(differentiate(&f, &vars, &[-1.0]).map(|_| 0.0), expected);

    let mut diff = CompiledDifferentiator::<f64>::new(&f, &vars).unwrap();
    assert_eq!(diff.evaluate(&[-1.0]), expected);
    assert_eq!(diff.differentiate(&[-1.0]).map(|(_, v)| v), expected);
}

#[test]
fn log_of_zero_fails() {
    let x = Variable::new();
    let f = log(power(&x, 2));
    let vars = [x];
    assert_eq!(
        differentiate(&f, &vars, &[0.0]),
        Err(Error::NonPositiveLogarithmArgument(0.0))
    );
    let mut diff = CompiledDifferentiator::<f64>::new(&f, &vars).unwrap();
    assert_eq!(
        diff.differentiate(&[0.0]),
        Err(Error::NonPositiveLogarithmArgument(0.0))
    );
}

#[test]
fn log_of_nan_fails() {
    let x = Variable::new();
    let f = log(&x);
    let mut diff = CompiledDifferentiator::<f64>::new(&f, &[x.clone()]).unwrap();
    assert!(matches!(
        diff.evaluate(&[f64::NAN]),
        Err(Error::NonPositiveLogarithmArgument(v)) if v.is_nan()
    ));
    assert!(matches!(
        differentiate(&f, &[x], &[f64::NAN]),
        Err(Error::NonPositiveLogarithmArgument(v)) if v.is_nan()
    ));
}

#[test]
fn compiled_recovers_after_failed_call() {
    let x = Variable::new();
    let f = log(&x) + &x;
    let mut diff = CompiledDifferentiator::<f64>::new(&f, &[x]).unwrap();
    assert!(diff.differentiate(&[-2.0]).is_err());
    let (g, v) = diff.differentiate(&[1.0]).unwrap();
    assert_eq!(v, 1.0);
    assert_eq!(g, vec![2.0]);
}

// ── Variable lists ──

#[test]
fn compile_without_variables() {
    let f = Term::constant(1.0);
    assert_eq!(
        CompiledDifferentiator::<f64>::new(&f, &[]).unwrap_err(),
        Error::NoVariables
    );
}

#[test]
fn compile_with_duplicate_variable() {
    let x = Variable::new();
    let f = power(&x, 2);
    assert_eq!(
        CompiledDifferentiator::<f64>::new(&f, &[x.clone(), x.clone()]).unwrap_err(),
        Error::DuplicateVariable {
            first: 0,
            second: 1
        }
    );
    assert_eq!(
        differentiate(&f, &[x.clone(), x], &[1.0, 1.0]),
        Err(Error::DuplicateVariable {
            first: 0,
            second: 1
        })
    );
}

#[test]
fn compile_with_unlisted_variable() {
    let x = Variable::new();
    let z = Variable::new();
    let f = &x + &z;
    assert!(matches!(
        CompiledDifferentiator::<f64>::new(&f, &[x.clone()]),
        Err(Error::UnboundVariable { .. })
    ));
    assert_eq!(
        differentiate(&f, &[x], &[1.0]),
        Err(Error::MissingVariableValue)
    );
}

#[test]
fn compiled_dimension_mismatch() {
    let x = Variable::new();
    let y = Variable::new();
    let f = &x * &y;
    let mut diff = CompiledDifferentiator::<f64>::new(&f, &[x, y]).unwrap();
    assert_eq!(
        diff.evaluate(&[1.0]),
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        diff.differentiate(&[1.0, 2.0, 3.0]).map(|(_, v)| v),
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn cross_product_needs_three_components() {
    let x = Variable::new();
    let a = TermVec::new([&x, &x]).unwrap();
    let b = TermVec::xyz(&x, &x, &x);
    assert!(matches!(a.cross_product(&b), Err(Error::DimensionMismatch { .. })));
    assert!(matches!(a.inner_product(&b), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn errors_display() {
    assert_eq!(
        Error::DimensionMismatch {
            expected: 3,
            actual: 2
        }
        .to_string(),
        "dimension mismatch: expected 3, got 2"
    );
    assert_eq!(
        Error::NonPositiveLogarithmArgument(-1.5).to_string(),
        "logarithm has non-positive argument -1.5"
    );
}
