//! Coordinator - the single owner of all expression and task state.
//!
//! Every operation the transport layer consumes runs as one atomic unit
//! under one coarse lock: no stale concurrent reads, at the price of
//! serializing all traffic. Nothing here blocks; parsing and graph
//! rewriting are bounded in-memory work, so the lock is a plain mutex and
//! is never held across an await point.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::CoordinatorConfig;
use crate::coord::model::{Expression, ExpressionStatus, ExpressionView, Task};
use crate::engine;
use crate::error::CoordError;
use crate::expr;

/// Coordinator for distributed expression reduction.
///
/// Constructor-injected into the transport layer rather than living in a
/// process-wide global, so the engine stays testable in isolation.
pub struct Coordinator {
    config: CoordinatorConfig,
    state: Mutex<State>,
}

/// Everything the coarse lock guards: both registries, the pending queue,
/// and the two monotonic id counters.
struct State {
    expressions: IndexMap<String, Expression>,
    tasks: HashMap<String, Task>,
    queue: VecDeque<Task>,
    expr_seq: u64,
    task_seq: u64,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                expressions: IndexMap::new(),
                tasks: HashMap::new(),
                queue: VecDeque::new(),
                expr_seq: 0,
                task_seq: 0,
            }),
        }
    }

    /// Parse and register an expression, then run the initial discovery
    /// pass so its leaf operations are queued immediately.
    pub fn submit(&self, source: &str) -> Result<String, CoordError> {
        let arena = expr::parse(source)?;

        let mut state = self.state.lock();
        state.expr_seq += 1;
        let id = state.expr_seq.to_string();

        let expression = Expression {
            id: id.clone(),
            source: source.to_string(),
            status: ExpressionStatus::Pending,
            result: None,
            arena,
        };
        state.expressions.insert(id.clone(), expression);
        state.discover(&id, &self.config);

        info!(expr_id = %id, expression = %source, "expression registered");
        Ok(id)
    }

    /// All expressions in registration order, reconciled before return.
    pub fn list_expressions(&self) -> Vec<ExpressionView> {
        let mut state = self.state.lock();
        state
            .expressions
            .values_mut()
            .map(|expr| {
                expr.reconcile();
                expr.view()
            })
            .collect()
    }

    /// One expression by id, reconciled before return.
    pub fn get_expression(&self, id: &str) -> Result<ExpressionView, CoordError> {
        let mut state = self.state.lock();
        let expr = state
            .expressions
            .get_mut(id)
            .ok_or_else(|| CoordError::ExpressionNotFound { id: id.to_string() })?;
        expr.reconcile();
        Ok(expr.view())
    }

    /// Hand out the queue head. The task stays in the by-id registry
    /// while in flight; its owning expression moves to in_progress.
    pub fn fetch_task(&self) -> Result<Task, CoordError> {
        let mut state = self.state.lock();
        let task = state.queue.pop_front().ok_or(CoordError::NoTaskAvailable)?;

        if let Some(expr) = state.expressions.get_mut(&task.expr_id) {
            if expr.status == ExpressionStatus::Pending {
                expr.status = ExpressionStatus::InProgress;
            }
        }

        debug!(task_id = %task.id, "task assigned");
        Ok(task)
    }

    /// Accept a task result: rewrite the target node, re-run discovery,
    /// and complete the expression if its root has settled.
    ///
    /// An id absent from the registry (already completed or never issued)
    /// is the one correctness guard against duplicate or stale reports:
    /// it yields not-found and mutates nothing.
    pub fn report_result(&self, id: &str, value: f64) -> Result<(), CoordError> {
        let mut state = self.state.lock();
        let task = state
            .tasks
            .remove(id)
            .ok_or_else(|| CoordError::TaskNotFound { id: id.to_string() })?;

        let expr_id = task.expr_id.clone();
        if let Some(expr) = state.expressions.get_mut(&expr_id) {
            engine::apply_result(&mut expr.arena, task.node, value);
        }
        state.discover(&expr_id, &self.config);

        if let Some(expr) = state.expressions.get_mut(&expr_id) {
            expr.reconcile();
            if let Some(result) = expr.result {
                info!(expr_id = %expr_id, result, "expression completed");
            }
        }

        debug!(task_id = %id, value, "task result applied");
        Ok(())
    }

    /// Number of tasks awaiting assignment.
    pub fn queue_depth(&self) -> usize {
        self.state.lock().queue.len()
    }
}

impl State {
    /// Run a discovery pass over one expression's graph and turn every
    /// newly ready operation into a queued task, in traversal order.
    fn discover(&mut self, expr_id: &str, config: &CoordinatorConfig) {
        let Some(expr) = self.expressions.get_mut(expr_id) else {
            return;
        };

        for ready in engine::discover_ready(&mut expr.arena) {
            self.task_seq += 1;
            let task = Task {
                id: self.task_seq.to_string(),
                expr_id: expr_id.to_string(),
                arg1: ready.lhs,
                arg2: ready.rhs,
                operation: ready.op,
                operation_time: config.operation_time(ready.op),
                node: ready.node,
            };
            debug!(
                task_id = %task.id,
                expr_id = %expr_id,
                operation = %task.operation,
                "task queued"
            );
            self.tasks.insert(task.id.clone(), task.clone());
            self.queue.push_back(task);
        }
    }
}
