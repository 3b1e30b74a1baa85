//! Reduction engine: discovers sub-computations that are ready for remote
//! evaluation and rewrites the term graph as their results arrive.
//!
//! The engine itself never performs arithmetic. Operator identity only
//! selects a simulated latency here; the actual function runs in a worker.

use tracing::debug;

use crate::expr::{BinaryOp, NodeId, Term, TermArena};

/// A sub-computation whose operands have both settled: everything a task
/// needs except an id and a latency, which the coordinator assigns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadyOp {
    pub node: NodeId,
    pub op: BinaryOp,
    pub lhs: f64,
    pub rhs: f64,
}

/// One discovery pass over the graph.
///
/// Post-order traversal, children before parent, so readiness is found
/// strictly bottom-up within a single pass. Every ready operation is
/// marked and returned in traversal order. The pass is idempotent:
/// settled or already-marked nodes are skipped, so running it twice with
/// no intervening completion yields nothing new.
pub fn discover_ready(arena: &mut TermArena) -> Vec<ReadyOp> {
    let mut ready = Vec::new();
    visit(arena, arena.root(), &mut ready);
    if !ready.is_empty() {
        debug!(count = ready.len(), "discovery pass emitted operations");
    }
    ready
}

fn visit(arena: &mut TermArena, node: NodeId, out: &mut Vec<ReadyOp>) {
    let (op, left, right, emitted) = match *arena.get(node) {
        Term::Literal(_) => return,
        Term::Operation {
            op,
            left,
            right,
            task_emitted,
        } => (op, left, right, task_emitted),
    };

    visit(arena, left, out);
    visit(arena, right, out);

    if emitted {
        return;
    }
    if let (Some(lhs), Some(rhs)) = (arena.literal_value(left), arena.literal_value(right)) {
        arena.mark_emitted(node);
        out.push(ReadyOp {
            node,
            op,
            lhs,
            rhs,
        });
    }
}

/// Completion rewrite: settle the target node to the reported value.
///
/// The node's former children become unreachable. Callers follow this with
/// a fresh [`discover_ready`] pass, which may newly ready the parent.
pub fn apply_result(arena: &mut TermArena, node: NodeId, value: f64) {
    arena.settle(node, value);
}

/// The expression's final value, present once the root has settled.
pub fn completed_value(arena: &TermArena) -> Option<f64> {
    arena.root_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_ready_node_in_mixed_expression() {
        // Only 2*2 is ready; the addition waits on it.
        let mut arena = parse("2+2*2").unwrap();
        let ready = discover_ready(&mut arena);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].op, BinaryOp::Mul);
        assert_eq!((ready[0].lhs, ready[0].rhs), (2.0, 2.0));
    }

    #[test]
    fn discovery_is_idempotent() {
        let mut arena = parse("1+2+3").unwrap();
        let first = discover_ready(&mut arena);
        assert_eq!(first.len(), 1);
        assert!(discover_ready(&mut arena).is_empty());
    }

    #[test]
    fn ready_nodes_come_out_in_post_order() {
        // ((1+2)+(3*4)): both leaf operations are ready, left subtree first.
        let mut arena = parse("1+2+3*4").unwrap();
        let ready = discover_ready(&mut arena);
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].op, BinaryOp::Add);
        assert_eq!((ready[0].lhs, ready[0].rhs), (1.0, 2.0));
        assert_eq!(ready[1].op, BinaryOp::Mul);
        assert_eq!((ready[1].lhs, ready[1].rhs), (3.0, 4.0));
    }

    #[test]
    fn completion_readies_the_parent() {
        let mut arena = parse("2+2*2").unwrap();
        let ready = discover_ready(&mut arena);
        apply_result(&mut arena, ready[0].node, 4.0);

        let next = discover_ready(&mut arena);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].op, BinaryOp::Add);
        assert_eq!((next[0].lhs, next[0].rhs), (2.0, 4.0));
        assert_eq!(completed_value(&arena), None);

        apply_result(&mut arena, next[0].node, 6.0);
        assert!(discover_ready(&mut arena).is_empty());
        assert_eq!(completed_value(&arena), Some(6.0));
    }

    #[test]
    fn literal_expression_is_complete_immediately() {
        let mut arena = parse("42").unwrap();
        assert!(discover_ready(&mut arena).is_empty());
        assert_eq!(completed_value(&arena), Some(42.0));
    }

    #[test]
    fn reduction_terminates_in_leaf_count_minus_one_steps() {
        let mut arena = parse("1+2+3+4").unwrap();
        let mut completions = 0;
        loop {
            let ready = discover_ready(&mut arena);
            if ready.is_empty() {
                break;
            }
            for op in ready {
                let value = op.op.apply(op.lhs, op.rhs).unwrap();
                apply_result(&mut arena, op.node, value);
                completions += 1;
            }
        }
        assert_eq!(completions, 3);
        assert_eq!(completed_value(&arena), Some(10.0));
    }
}
