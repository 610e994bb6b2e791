//! Immutable scalar expression graph.
//!
//! A [`Term`] is a cheap, clonable handle to a shared node. Cloning a handle
//! shares the node, so the same sub-expression may feed several parents
//! (DAG sharing). Two structurally equal terms built separately stay distinct:
//! node identity, not value, is what the evaluators and the compiler key on.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Identity of a node in the term graph.
///
/// Only meaningful while some handle keeps the node alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The closed set of node kinds.
#[derive(Debug)]
pub enum Node {
    Constant(f64),
    /// Lightweight zero leaf; differentiates to an empty gradient.
    Zero,
    Variable(VariableInfo),
    IntPower { base: Term, exponent: i32 },
    Product { left: Term, right: Term },
    /// At least two terms.
    Sum(Vec<Term>),
    Log(Term),
    Exp(Term),
    /// Non-empty; the first piece whose condition holds supplies the value.
    Piecewise(Vec<(Inequality, Term)>),
}

/// Payload of a variable leaf. Variables are compared by identity only.
#[derive(Debug, Default)]
pub struct VariableInfo {
    name: Option<String>,
}

/// Shared handle to a node of the expression graph.
#[derive(Clone)]
pub struct Term(Arc<Node>);

impl Term {
    pub(crate) fn from_node(node: Node) -> Self {
        Term(Arc::new(node))
    }

    /// A constant leaf.
    pub fn constant(value: f64) -> Self {
        Term::from_node(Node::Constant(value))
    }

    /// The zero leaf.
    pub fn zero() -> Self {
        Term::from_node(Node::Zero)
    }

    /// `base ^ exponent` for an integer exponent.
    pub fn int_power(base: impl Into<Term>, exponent: i32) -> Self {
        Term::from_node(Node::IntPower {
            base: base.into(),
            exponent,
        })
    }

    /// `left * right`.
    pub fn product(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Term::from_node(Node::Product {
            left: left.into(),
            right: right.into(),
        })
    }

    /// N-ary sum. Fails unless at least two terms are given.
    pub fn sum(terms: Vec<Term>) -> Result<Self> {
        if terms.len() < 2 {
            return Err(Error::InvalidTerm("a sum needs at least two terms"));
        }
        Ok(Term::from_node(Node::Sum(terms)))
    }

    /// Natural logarithm.
    pub fn log(arg: impl Into<Term>) -> Self {
        Term::from_node(Node::Log(arg.into()))
    }

    /// Natural exponent.
    pub fn exp(arg: impl Into<Term>) -> Self {
        Term::from_node(Node::Exp(arg.into()))
    }

    /// Piecewise term selecting the first piece whose condition holds.
    /// Fails if `pieces` is empty.
    pub fn piecewise(pieces: Vec<(Inequality, Term)>) -> Result<Self> {
        if pieces.is_empty() {
            return Err(Error::InvalidTerm("a piecewise term needs at least one piece"));
        }
        Ok(Term::from_node(Node::Piecewise(pieces)))
    }

    /// The node behind this handle.
    #[inline]
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Identity of the node behind this handle.
    #[inline]
    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as usize)
    }

    /// `true` if both handles point at the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Term) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// `true` if this term is a variable leaf.
    pub fn is_variable(&self) -> bool {
        matches!(*self.0, Node::Variable(_))
    }

    /// View this term as a variable, if it is one.
    pub fn as_variable(&self) -> Option<Variable> {
        if self.is_variable() {
            Some(Variable::wrap(self.clone()))
        } else {
            None
        }
    }

    /// Direct operands in argument-position order.
    ///
    /// For a piecewise term the order is `cond_0, value_0, cond_1, value_1, ...`.
    pub fn children(&self) -> Vec<&Term> {
        match self.node() {
            Node::Constant(_) | Node::Zero | Node::Variable(_) => Vec::new(),
            Node::IntPower { base, .. } => vec![base],
            Node::Product { left, right } => vec![left, right],
            Node::Sum(terms) => terms.iter().collect(),
            Node::Log(arg) | Node::Exp(arg) => vec![arg],
            Node::Piecewise(pieces) => pieces
                .iter()
                .flat_map(|(cond, value)| [cond.term(), value])
                .collect(),
        }
    }

    /// Condition `self <= value`.
    pub fn less_than_equals(&self, value: f64) -> Inequality {
        Inequality::new(self.clone() - value)
    }

    /// Condition `self >= value`.
    pub fn greater_than_equals(&self, value: f64) -> Inequality {
        Inequality::new(value - self.clone())
    }
}

// Tear down uniquely owned nodes with a worklist. The default drop glue would
// recurse once per level and overflow on long chains.
impl Drop for Term {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        if let Some(node) = Arc::get_mut(&mut self.0) {
            detach_children(node, &mut pending);
        }
        while let Some(mut term) = pending.pop() {
            if let Some(node) = Arc::get_mut(&mut term.0) {
                detach_children(node, &mut pending);
            }
            // `term` now owns a childless node (or a shared one), so this
            // drop does not descend.
        }
    }
}

/// Move the children of `node` into `out`, leaving a `Zero` leaf behind.
fn detach_children(node: &mut Node, out: &mut Vec<Term>) {
    if node.is_leaf() {
        return;
    }
    match std::mem::replace(node, Node::Zero) {
        Node::Constant(_) | Node::Zero | Node::Variable(_) => {}
        Node::IntPower { base, .. } => out.push(base),
        Node::Product { left, right } => {
            out.push(left);
            out.push(right);
        }
        Node::Sum(terms) => out.extend(terms),
        Node::Log(arg) | Node::Exp(arg) => out.push(arg),
        Node::Piecewise(pieces) => {
            for (cond, value) in pieces {
                out.push(cond.term);
                out.push(value);
            }
        }
    }
}

impl Node {
    fn is_leaf(&self) -> bool {
        matches!(self, Node::Constant(_) | Node::Zero | Node::Variable(_))
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Constant(v) => write!(f, "{v}"),
            Node::Zero => write!(f, "0"),
            Node::Variable(info) => match &info.name {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "var@{:x}", self.id().0),
            },
            Node::IntPower { base, exponent } => write!(f, "({base:?})^{exponent}"),
            Node::Product { left, right } => write!(f, "({left:?} * {right:?})"),
            Node::Sum(terms) => {
                write!(f, "(")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{t:?}")?;
                }
                write!(f, ")")
            }
            Node::Log(arg) => write!(f, "log({arg:?})"),
            Node::Exp(arg) => write!(f, "exp({arg:?})"),
            Node::Piecewise(pieces) => f.debug_list().entries(pieces.iter()).finish(),
        }
    }
}

// ──────────────────────────────────────────────
//  Variable
// ──────────────────────────────────────────────

/// An independent input. Equality and hashing use node identity, so two
/// variables with the same name are still different inputs.
#[derive(Clone)]
pub struct Variable(Term, NodeId);

impl Variable {
    fn wrap(term: Term) -> Self {
        let id = term.id();
        Variable(term, id)
    }

    /// A fresh anonymous variable.
    pub fn new() -> Self {
        Variable::wrap(Term::from_node(Node::Variable(VariableInfo::default())))
    }

    /// A fresh variable carrying a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Variable::wrap(Term::from_node(Node::Variable(VariableInfo {
            name: Some(name.into()),
        })))
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        match self.0.node() {
            Node::Variable(info) => info.name.as_deref(),
            _ => None,
        }
    }

    /// The variable as a term handle (shares the node).
    pub fn term(&self) -> &Term {
        &self.0
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.1
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.1.hash(state);
    }
}

// Lets maps keyed by `Variable` be probed with a bare node identity.
impl Borrow<NodeId> for Variable {
    fn borrow(&self) -> &NodeId {
        &self.1
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Term {
        v.0
    }
}

impl From<&Variable> for Term {
    fn from(v: &Variable) -> Term {
        v.0.clone()
    }
}

impl From<&Term> for Term {
    fn from(t: &Term) -> Term {
        t.clone()
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Term {
        crate::builder::constant(value)
    }
}

// ──────────────────────────────────────────────
//  Inequality
// ──────────────────────────────────────────────

/// Condition `term <= 0` guarding a piece of a piecewise term.
#[derive(Clone, Debug)]
pub struct Inequality {
    term: Term,
}

impl Inequality {
    /// Condition that holds when `term` evaluates to a value `<= 0`.
    pub fn new(term: impl Into<Term>) -> Self {
        Inequality { term: term.into() }
    }

    /// A condition that holds everywhere, for a trailing catch-all piece.
    pub fn always_true() -> Self {
        Inequality::new(Term::constant(-1.0))
    }

    /// The term compared against zero.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Whether the condition holds for an evaluated `term` value.
    #[inline]
    pub fn holds(value: f64) -> bool {
        value <= 0.0
    }
}
