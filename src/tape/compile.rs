use std::collections::HashMap;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode::OpCode;
use crate::term::{Node, NodeId, Term, Variable};

use super::{Connection, Tape};

impl<F: Float> Tape<F> {
    /// Linearize the graph rooted at `root` into a tape.
    ///
    /// `variables` occupy positions `0..variables.len()` in order. The rest of
    /// the graph is emitted in post-order (operands before their consumer),
    /// one element per distinct node. A root that is itself a bare variable is
    /// wrapped in `IntPower(root, 1)` so the output never aliases an input.
    ///
    /// Traversal uses an explicit stack, so graph depth is bounded by memory
    /// rather than by the call stack.
    pub fn compile(root: &Term, variables: &[Variable]) -> Result<Self> {
        let wrapped;
        let root = if root.is_variable() {
            trace!("root is a bare variable; wrapping it in a unit power");
            wrapped = Term::int_power(root, 1);
            &wrapped
        } else {
            root
        };

        let mut builder = TapeBuilder::<F>::with_capacity(variables.len());
        for (i, var) in variables.iter().enumerate() {
            if let Some(first) = builder.index_of.get(&var.id()) {
                return Err(Error::DuplicateVariable {
                    first: *first as usize,
                    second: i,
                });
            }
            builder.emit(var.id(), OpCode::Input, &[], 0, F::zero())?;
        }

        // (node, operands already pushed)
        let mut stack: Vec<(&Term, bool)> = vec![(root, false)];
        while let Some((term, expanded)) = stack.pop() {
            if builder.index_of.contains_key(&term.id()) {
                continue;
            }
            let children = term.children();
            if expanded || children.is_empty() {
                builder.emit_term(term, &children)?;
                continue;
            }
            stack.push((term, true));
            for child in children.into_iter().rev() {
                if !builder.index_of.contains_key(&child.id()) {
                    stack.push((child, false));
                }
            }
        }

        let tape = builder.finish(variables.len());
        debug!(
            "compiled tape: {} elements, {} inputs, {} operand references",
            tape.len(),
            tape.num_inputs(),
            tape.args.len()
        );
        Ok(tape)
    }
}

/// Accumulates tape elements during compilation.
struct TapeBuilder<F> {
    opcodes: Vec<OpCode>,
    arg_offsets: Vec<u32>,
    args: Vec<u32>,
    exponents: Vec<i32>,
    values: Vec<F>,
    consumers: Vec<Vec<Connection>>,
    index_of: HashMap<NodeId, u32>,
}

impl<F: Float> TapeBuilder<F> {
    fn with_capacity(n: usize) -> Self {
        TapeBuilder {
            opcodes: Vec::with_capacity(n + 1),
            arg_offsets: vec![0],
            args: Vec::new(),
            exponents: Vec::with_capacity(n + 1),
            values: Vec::with_capacity(n + 1),
            consumers: Vec::with_capacity(n + 1),
            index_of: HashMap::with_capacity(n + 1),
        }
    }

    /// Emit `term`, whose operands (`children`) are all on the tape already.
    fn emit_term(&mut self, term: &Term, children: &[&Term]) -> Result<u32> {
        let operands = children
            .iter()
            .map(|c| self.index_of.get(&c.id()).copied())
            .collect::<Option<Vec<u32>>>()
            .ok_or(Error::InvalidTerm("operand emitted after its consumer"))?;

        let id = term.id();
        match term.node() {
            Node::Constant(v) => {
                let value = F::from_f64(*v).ok_or(Error::UnrepresentableConstant(*v))?;
                self.emit(id, OpCode::Const, &[], 0, value)
            }
            Node::Zero => self.emit(id, OpCode::Const, &[], 0, F::zero()),
            Node::Variable(_) => Err(Error::UnboundVariable {
                index: self.opcodes.len(),
            }),
            Node::IntPower { exponent, .. } => {
                self.emit(id, OpCode::Powi, &operands, *exponent, F::zero())
            }
            Node::Product { .. } => self.emit(id, OpCode::Mul, &operands, 0, F::zero()),
            Node::Sum(_) => self.emit(id, OpCode::Sum, &operands, 0, F::zero()),
            Node::Log(_) => self.emit(id, OpCode::Ln, &operands, 0, F::zero()),
            Node::Exp(_) => self.emit(id, OpCode::Exp, &operands, 0, F::zero()),
            Node::Piecewise(_) => self.emit(id, OpCode::Piecewise, &operands, 0, F::zero()),
        }
    }

    /// Append one element and register it as a consumer of its operands.
    fn emit(
        &mut self,
        id: NodeId,
        op: OpCode,
        operands: &[u32],
        exponent: i32,
        value: F,
    ) -> Result<u32> {
        let len = self.opcodes.len();
        let idx = u32::try_from(len).map_err(|_| Error::GraphTooLarge(len))?;
        if u32::try_from(self.args.len() + operands.len()).is_err() {
            return Err(Error::GraphTooLarge(len));
        }

        for (pos, &operand) in operands.iter().enumerate() {
            self.consumers[operand as usize].push(Connection {
                consumer: idx,
                arg_position: pos as u32,
            });
        }

        self.opcodes.push(op);
        self.args.extend_from_slice(operands);
        self.arg_offsets.push(self.args.len() as u32);
        self.exponents.push(exponent);
        self.values.push(value);
        self.consumers.push(Vec::new());
        self.index_of.insert(id, idx);
        Ok(idx)
    }

    fn finish(self, num_inputs: usize) -> Tape<F> {
        let n = self.opcodes.len();
        let mut input_of_offsets = Vec::with_capacity(n + 1);
        let mut input_of = Vec::with_capacity(self.args.len());
        input_of_offsets.push(0);
        for list in &self.consumers {
            input_of.extend_from_slice(list);
            input_of_offsets.push(input_of.len() as u32);
        }

        Tape {
            opcodes: self.opcodes,
            arg_offsets: self.arg_offsets,
            args: self.args,
            exponents: self.exponents,
            input_of_offsets,
            input_of,
            values: self.values,
            faults: vec![None; n],
            derivatives: vec![F::zero(); n],
            num_inputs: num_inputs as u32,
        }
    }
}
