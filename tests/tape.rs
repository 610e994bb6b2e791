use termdiff::builder::{exp, power};
use termdiff::opcode::OpCode;
use termdiff::{CompiledDifferentiator, Connection, Tape, Term, Variable};

fn structure(tape: &Tape<f64>) -> Vec<(OpCode, Vec<u32>, i32)> {
    (0..tape.len())
        .map(|i| (tape.opcode(i), tape.operands(i).to_vec(), tape.exponent(i)))
        .collect()
}

#[test]
fn inputs_come_first_in_list_order() {
    let x = Variable::new();
    let y = Variable::new();
    let f = &y * exp(&x);
    let tape = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    assert_eq!(tape.num_inputs(), 2);
    assert_eq!(tape.opcode(0), OpCode::Input);
    assert_eq!(tape.opcode(1), OpCode::Input);
    // x, y, exp(x), y * exp(x)
    assert_eq!(tape.len(), 4);
    assert_eq!(tape.opcode(2), OpCode::Exp);
    assert_eq!(tape.operands(2), &[0]);
    assert_eq!(tape.opcode(3), OpCode::Mul);
    assert_eq!(tape.operands(3), &[1, 2]);
    assert_eq!(tape.output_index(), 3);
}

#[test]
fn operands_precede_consumers() {
    let x = Variable::new();
    let y = Variable::new();
    let z = Variable::new();
    let a = &x * &y;
    let b = power(&a + &z, 3);
    let f = exp(&b - &a) / (&b + 1.0);
    let tape = Tape::<f64>::compile(&f, &[x, y, z]).unwrap();
    for i in 0..tape.len() {
        for &op in tape.operands(i) {
            assert!((op as usize) < i, "element {i} reads later element {op}");
        }
    }
    assert!(!tape.opcode(tape.output_index()).is_leaf());
}

#[test]
fn shared_node_is_emitted_once() {
    let x = Variable::new();
    let y = Variable::new();
    let s = &x + &y;
    let f = &s * &s;
    let tape = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    // x, y, s, s*s
    assert_eq!(tape.len(), 4);
    assert_eq!(tape.operands(3), &[2, 2]);
}

#[test]
fn input_of_lists_every_use() {
    let x = Variable::new();
    let y = Variable::new();
    let s = &x + &y;
    let f = &s * &s;
    let tape = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    assert_eq!(
        tape.input_of(2),
        &[
            Connection {
                consumer: 3,
                arg_position: 0
            },
            Connection {
                consumer: 3,
                arg_position: 1
            },
        ]
    );
    assert_eq!(
        tape.input_of(0),
        &[Connection {
            consumer: 2,
            arg_position: 0
        }]
    );
    assert_eq!(
        tape.input_of(1),
        &[Connection {
            consumer: 2,
            arg_position: 1
        }]
    );
    assert!(tape.input_of(3).is_empty());
}

#[test]
fn input_of_is_consistent_with_operands() {
    let x = Variable::new();
    let y = Variable::new();
    let g = &x * &y;
    let f = power(&g, 2) + exp(&g) + &x;
    let tape = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    let mut forward_edges = Vec::new();
    for i in 0..tape.len() {
        for (pos, &op) in tape.operands(i).iter().enumerate() {
            forward_edges.push((op, i as u32, pos as u32));
        }
    }
    let mut backward_edges = Vec::new();
    for i in 0..tape.len() {
        for c in tape.input_of(i) {
            backward_edges.push((i as u32, c.consumer, c.arg_position));
        }
    }
    forward_edges.sort_unstable();
    backward_edges.sort_unstable();
    assert_eq!(forward_edges, backward_edges);
}

#[test]
fn compilation_is_deterministic() {
    let x = Variable::new();
    let y = Variable::new();
    let shared = exp(&x * &y);
    let f = power(&shared, 2) + &shared * &y - 4.0 / &x;
    let a = Tape::<f64>::compile(&f, &[x.clone(), y.clone()]).unwrap();
    let b = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    assert_eq!(structure(&a), structure(&b));
    for i in 0..a.len() {
        assert_eq!(a.input_of(i), b.input_of(i));
    }
}

#[test]
fn constants_are_preloaded() {
    let x = Variable::new();
    let f = 3.0 * &x;
    let tape = Tape::<f64>::compile(&f, &[x]).unwrap();
    assert_eq!(tape.len(), 3);
    assert_eq!(tape.opcode(1), OpCode::Const);
    assert_eq!(tape.values()[1], 3.0);
}

#[test]
fn zero_leaf_compiles_to_zero_constant() {
    let x = Variable::new();
    let f = &x + Term::zero();
    let tape = Tape::<f64>::compile(&f, &[x]).unwrap();
    assert_eq!(tape.opcode(1), OpCode::Const);
    assert_eq!(tape.values()[1], 0.0);
}

#[test]
fn bare_variable_root_is_wrapped() {
    let x = Variable::new();
    let tape = Tape::<f64>::compile(x.term(), &[x.clone()]).unwrap();
    assert_eq!(tape.len(), 2);
    assert_eq!(tape.opcode(1), OpCode::Powi);
    assert_eq!(tape.exponent(1), 1);
    assert_eq!(tape.operands(1), &[0]);
}

#[test]
fn power_exponent_is_recorded() {
    let x = Variable::new();
    let f = power(&x, -3);
    let tape = Tape::<f64>::compile(&f, &[x]).unwrap();
    assert_eq!(tape.opcode(1), OpCode::Powi);
    assert_eq!(tape.exponent(1), -3);
}

#[test]
fn sum_keeps_every_summand() {
    let x = Variable::new();
    let y = Variable::new();
    let z = Variable::new();
    let f = termdiff::builder::sum([&x, &y, &z, &x]);
    let tape = Tape::<f64>::compile(&f, &[x, y, z]).unwrap();
    assert_eq!(tape.opcode(3), OpCode::Sum);
    assert_eq!(tape.operands(3), &[0, 1, 2, 0]);
}

#[test]
fn forward_and_reverse_on_raw_tape() {
    let x = Variable::new();
    let y = Variable::new();
    let f = &x * &y + &x;
    let mut tape = Tape::<f64>::compile(&f, &[x, y]).unwrap();
    let v = tape.forward(&[2.0, 5.0]).unwrap();
    assert_eq!(v, 12.0);
    assert_eq!(tape.output_value(), 12.0);
    tape.reverse().unwrap();
    assert_eq!(&tape.derivatives()[..2], &[6.0, 2.0]);
    assert_eq!(tape.derivatives()[tape.output_index()], 1.0);
}

#[test]
fn compiled_differentiator_exposes_its_tape() {
    let x = Variable::new();
    let f = exp(&x);
    let diff = CompiledDifferentiator::<f64>::new(&f, &[x]).unwrap();
    assert_eq!(diff.tape().len(), 2);
    assert_eq!(diff.tape().num_inputs(), 1);
}

#[test]
fn deep_chain_compiles_without_recursion() {
    let x = Variable::new();
    let mut f: Term = x.term().clone();
    for _ in 0..200_000 {
        f = &f + 1.0;
    }
    let mut diff = CompiledDifferentiator::<f64>::new(&f, &[x]).unwrap();
    let (g, v) = diff.differentiate(&[0.0]).unwrap();
    assert_eq!(v, 200_000.0);
    assert_eq!(g, vec![1.0]);
    drop(f);
}

#[test]
fn buffers_from_another_tape_pick_up_this_tapes_constants() {
    let x = Variable::new();
    let three = CompiledDifferentiator::<f64>::new(&(3.0 * &x), &[x.clone()]).unwrap();
    let seven = CompiledDifferentiator::<f64>::new(&(7.0 * &x), &[x]).unwrap();
    assert_eq!(three.tape().len(), seven.tape().len());

    let mut buffers = three.buffers();
    assert_eq!(seven.evaluate_into(&[1.0], &mut buffers).unwrap(), 7.0);
    let mut g = Vec::new();
    assert_eq!(seven.differentiate_into(&[2.0], &mut buffers, &mut g).unwrap(), 14.0);
    assert_eq!(g, vec![7.0]);
    // and back again
    assert_eq!(three.evaluate_into(&[1.0], &mut buffers).unwrap(), 3.0);
}

#[test]
fn buffers_of_another_size_are_rebuilt() {
    let x = Variable::new();
    let small = CompiledDifferentiator::<f64>::new(&(2.0 * &x), &[x.clone()]).unwrap();
    let large = CompiledDifferentiator::<f64>::new(&(exp(&x) + 5.0 * &x), &[x]).unwrap();
    let mut buffers = small.buffers();
    let v = large.evaluate_into(&[0.0], &mut buffers).unwrap();
    assert_eq!(v, 1.0);
    assert_eq!(buffers.values().len(), large.tape().len());
}

#[test]
fn reverse_into_rejects_unsized_buffers() {
    let x = Variable::new();
    let small = Tape::<f64>::compile(&(2.0 * &x), &[x.clone()]).unwrap();
    let large = Tape::<f64>::compile(&(exp(&x) + 5.0 * &x), &[x]).unwrap();
    let mut buffers = small.buffers();
    assert!(matches!(
        large.reverse_into(&mut buffers),
        Err(termdiff::Error::DimensionMismatch { .. })
    ));
}

#[test]
fn faulted_elements_are_marked() {
    let x = Variable::new();
    let f = termdiff::builder::piecewise([
        (x.term().less_than_equals(0.0), Term::zero()),
        (termdiff::Inequality::always_true(), termdiff::builder::log(&x)),
    ])
    .unwrap();
    let mut tape = Tape::<f64>::compile(&f, &[x]).unwrap();
    assert_eq!(tape.forward(&[-1.0]).unwrap(), 0.0);
    let ln = (0..tape.len())
        .find(|&i| tape.opcode(i) == OpCode::Ln)
        .unwrap();
    assert!(tape.is_faulted(ln));
    assert!(tape.values()[ln].is_nan());
    assert!(!tape.is_faulted(tape.output_index()));

    tape.forward(&[2.0]).unwrap();
    assert!(!tape.is_faulted(ln));
}

#[test]
fn leaf_opcodes_are_not_evaluated() {
    let values = [1.0_f64, 2.0];
    for op in [OpCode::Input, OpCode::Const] {
        assert!(matches!(
            termdiff::opcode::eval_forward(op, &[], &values, 0),
            Err(termdiff::Error::NotSupported(_))
        ));
    }
    assert_eq!(
        termdiff::opcode::eval_forward(OpCode::Mul, &[0, 1], &values, 0),
        Ok(2.0)
    );
}
