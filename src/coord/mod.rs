//! Coordination layer: expression/task registries, the pending queue, and
//! the single-locked coordinator the transport layer talks to.

pub mod coordinator;
pub mod model;

pub use coordinator::Coordinator;
pub use model::{Expression, ExpressionStatus, ExpressionView, Task};
