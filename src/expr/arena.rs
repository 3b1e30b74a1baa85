use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Stable index into a [`TermArena`].
///
/// Slots are never freed or reused, so an id handed to an in-flight task
/// stays valid across any number of in-place rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One of the four primitive binary operators.
///
/// Serialized as its symbol, which is also the wire form tasks carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl BinaryOp {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    /// Perform the operation. Division by zero is the one input the
    /// arithmetic itself rejects.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => {
                if rhs == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(lhs / rhs)
                }
            }
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A node in the term graph: either a settled value or an operation whose
/// children still reduce toward values.
///
/// `task_emitted` marks an operation that already has a task outstanding,
/// so a discovery pass never emits it twice.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Literal(f64),
    Operation {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
        task_emitted: bool,
    },
}

/// Arena holding one expression's term graph.
///
/// Nodes live in a flat vector addressed by [`NodeId`]. An operation slot
/// is overwritten in place with a literal once its result arrives; former
/// children simply become unreachable. The graph is a pure tree, so the
/// arena shrinks (in reachable nodes) monotonically toward a single
/// literal at the root.
#[derive(Debug, Clone)]
pub struct TermArena {
    nodes: Vec<Term>,
    root: NodeId,
}

impl TermArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn alloc(&mut self, term: Term) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(term);
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Term {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.nodes.iter()
    }

    /// Value of the node if (and only if) it has settled to a literal.
    pub fn literal_value(&self, id: NodeId) -> Option<f64> {
        match self.get(id) {
            Term::Literal(value) => Some(*value),
            Term::Operation { .. } => None,
        }
    }

    /// Value of the whole expression once reduction has finished.
    pub fn root_value(&self) -> Option<f64> {
        self.literal_value(self.root)
    }

    /// Overwrite a slot with a literal, in place. Ids held elsewhere keep
    /// pointing at the same slot and now observe the settled value.
    pub fn settle(&mut self, id: NodeId, value: f64) {
        self.nodes[id.index()] = Term::Literal(value);
    }

    /// Mark an operation so later discovery passes skip it. No-op on a
    /// slot that already settled.
    pub fn mark_emitted(&mut self, id: NodeId) {
        if let Term::Operation { task_emitted, .. } = &mut self.nodes[id.index()] {
            *task_emitted = true;
        }
    }
}

impl Default for TermArena {
    fn default() -> Self {
        Self::new()
    }
}
