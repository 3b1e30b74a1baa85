//! Distributed arithmetic expression evaluator.
//!
//! An infix expression is decomposed into a graph of primitive binary
//! operations. The coordinator hands ready operations to polling workers
//! as latency-scaled tasks and rewrites the graph in place as results
//! come back, until a single value remains.

pub mod config;
pub mod coord;
pub mod engine;
pub mod error;
pub mod expr;
pub mod server;
pub mod worker;

// Re-exports for convenience
pub use config::{CoordinatorConfig, WorkerConfig};
pub use coord::{Coordinator, Expression, ExpressionStatus, ExpressionView, Task};
pub use error::{CoordError, EvalError, ParseError};
pub use expr::{parse, BinaryOp, NodeId, Term, TermArena};
pub use worker::Worker;
