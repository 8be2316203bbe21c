//! Ancestor-slot resolution (spec §4.3): named path steps that require
//! access to an outer context get a `slot`, assigned by walking the step
//! list backwards and binding each `%` reference to the nearest
//! enclosing step.

use crate::ast::{ExpressionNode, Slot};

/// Resolve `%` (parent) references reachable from `node`.
pub fn resolve_ancestors(node: ExpressionNode) -> ExpressionNode {
    match node {
        ExpressionNode::Path { steps, keep_singleton_array, position } => {
            let labels: Vec<String> = (0..steps.len()).map(|i| format!("$$ancestor{i}")).collect();
            let steps = steps
                .into_iter()
                .enumerate()
                .map(|(i, step)| bind_parent_slots(step, &labels, i))
                .map(resolve_ancestors)
                .collect();
            ExpressionNode::Path { steps, keep_singleton_array, position }
        }
        ExpressionNode::FlashBlock(mut b) => {
            b.rules = b.rules.into_iter().map(resolve_ancestors).collect();
            ExpressionNode::FlashBlock(b)
        }
        ExpressionNode::FlashRule(mut r) => {
            r.inline_expression = r.inline_expression.map(|e| Box::new(resolve_ancestors(*e)));
            r.subrules = r.subrules.into_iter().map(resolve_ancestors).collect();
            ExpressionNode::FlashRule(r)
        }
        ExpressionNode::Lambda(mut l) => {
            l.body = Box::new(resolve_ancestors(*l.body));
            ExpressionNode::Lambda(l)
        }
        other => other,
    }
}

fn bind_parent_slots(node: ExpressionNode, labels: &[String], current_index: usize) -> ExpressionNode {
    match node {
        ExpressionNode::Parent { slot: None, position } => {
            let index = current_index.saturating_sub(1);
            let label = labels.get(index).cloned().unwrap_or_else(|| "$$ancestor0".to_string());
            ExpressionNode::Parent { slot: Some(Slot { label, index }), position }
        }
        ExpressionNode::Binary { op, lhs, rhs, position } => ExpressionNode::Binary {
            op,
            lhs: Box::new(bind_parent_slots(*lhs, labels, current_index)),
            rhs: Box::new(bind_parent_slots(*rhs, labels, current_index)),
            position,
        },
        other => other,
    }
}
