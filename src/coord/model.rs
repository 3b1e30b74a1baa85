use serde::{Deserialize, Serialize};

use crate::expr::{BinaryOp, NodeId, TermArena};

/// Lifecycle of a submitted expression.
///
/// The stored value is a cache: `completed` is always re-derived from the
/// root node's shape at read time, never trusted from a mutation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStatus {
    Pending,
    InProgress,
    Completed,
}

/// A registered expression and the term graph it reduces over.
///
/// Entries are permanent: the registry never drops an expression once it
/// has been created.
#[derive(Debug)]
pub struct Expression {
    pub id: String,
    pub source: String,
    pub status: ExpressionStatus,
    pub result: Option<f64>,
    pub arena: TermArena,
}

impl Expression {
    /// Reconcile the cached status with the graph. If the root has settled
    /// the expression is completed with that value, whatever the cache
    /// said before.
    pub fn reconcile(&mut self) {
        if let Some(value) = self.arena.root_value() {
            self.status = ExpressionStatus::Completed;
            self.result = Some(value);
        }
    }

    pub fn view(&self) -> ExpressionView {
        ExpressionView {
            id: self.id.clone(),
            source: self.source.clone(),
            status: self.status,
            result: self.result,
        }
    }
}

/// Client-facing snapshot of an expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionView {
    pub id: String,
    #[serde(rename = "expression")]
    pub source: String,
    pub status: ExpressionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
}

/// One primitive binary operation dispatched to a worker.
///
/// Only the fields a worker needs go over the wire; the owning expression
/// and the target node stay internal. The record lives in the by-id
/// registry from discovery until its result is reported, including the
/// whole time it is in flight.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(skip)]
    pub expr_id: String,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: BinaryOp,
    pub operation_time: u64,
    #[serde(skip)]
    pub node: NodeId,
}
